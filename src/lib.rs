//! YouTube ad skipper - browser extension core.
//!
//! This library implements both halves of a Manifest V3 extension that
//! forces video ads to end and offers a manual "Force Skip Ad" button in
//! the player controls.
//!
//! # Architecture
//!
//! The extension runs in two isolated contexts that share no memory:
//!
//! - **Background (service worker)**: owns the "show manual skip button"
//!   preference, renders it as a checkbox in the toolbar action's context
//!   menu, and pushes user toggles to the active page
//! - **Content (every page of the site)**: watches DOM mutations, ends ads
//!   on each tick, and keeps the manual button in line with the preference
//!
//! They talk only through extension storage and tab messages. Every host
//! API sits behind a trait in [`host`], so both programs run natively
//! against in-memory hosts and on `wasm32` against `chrome.*`.
//!
//! # Quick Start
//!
//! ```
//! use yt_ad_skipper::content::{PageInterventionist, VirtualDocument};
//! use yt_ad_skipper::host::MemoryHost;
//! use yt_ad_skipper::{PreferenceCoordinator, Result, SkipperConfig};
//! use yt_ad_skipper::protocol::InstalledDetails;
//!
//! # fn main() -> Result<()> {
//! # tokio_test::block_on(async {
//! let host = MemoryHost::new();
//!
//! // Background: first install stores the default and builds the menu.
//! let coordinator = PreferenceCoordinator::new(host.clone(), SkipperConfig::default());
//! coordinator.handle_installed(&InstalledDetails::install()).await?;
//!
//! // Content: a page seeds its session from storage.
//! let page = PageInterventionist::new(VirtualDocument::new(), SkipperConfig::default());
//! assert!(page.initialize(&host).await?);
//! # Ok::<(), yt_ad_skipper::Error>(())
//! # })
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`background`] | Preference coordinator and its events |
//! | [`content`] | Page interventionist, DOM seam, in-memory document |
//! | [`config`] | [`SkipperConfig`] and page selectors |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | Host API traits and [`MemoryHost`] |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`preference`] | Stored preference and its defaults |
//! | [`protocol`] | Wire types matching the extension APIs |
//!
//! On `wasm32` the crate also exports `start_background` and
//! `start_content` for the extension's JS glue.

// ============================================================================
// Modules
// ============================================================================

/// Background context.
///
/// - [`PreferenceCoordinator`] - Menu, persistence and page fan-out
/// - [`BackgroundEvent`](background::BackgroundEvent) - Host notifications
pub mod background;

/// Extension configuration.
pub mod config;

/// Content context.
///
/// - [`PageInterventionist`] - Per-page controller
/// - [`Dom`](content::Dom) - Document seam
/// - [`VirtualDocument`] - In-memory document
pub mod content;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Host extension platform seams.
pub mod host;

/// Type-safe identifiers for browser entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// The manual skip button preference.
pub mod preference;

/// Extension API wire types.
pub mod protocol;

/// Browser bindings.
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// ============================================================================
// Re-exports
// ============================================================================

// Background types
pub use background::{BackgroundEvent, ClickOutcome, PreferenceCoordinator};

// Configuration types
pub use config::{ButtonSpec, MenuConfig, Selectors, SkipperConfig};

// Content types
pub use content::{PageEvent, PageInterventionist, Reconcile, SkipOutcome, VirtualDocument};

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{BackgroundHost, ContextMenus, MemoryHost, PreferenceStore, TabMessenger};

// Identifier types
pub use identifiers::{MenuItemId, TabId};

// Preference types
pub use preference::SkipperPreference;
