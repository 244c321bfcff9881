//! Background context: the preference coordinator.
//!
//! Long-lived. Owns the manual skip button preference, renders the
//! checkbox entry in the toolbar action's context menu, and pushes user
//! toggles to the active page.
//!
//! # Example
//!
//! ```
//! use yt_ad_skipper::background::{BackgroundEvent, PreferenceCoordinator};
//! use yt_ad_skipper::host::MemoryHost;
//! use yt_ad_skipper::protocol::InstalledDetails;
//! use yt_ad_skipper::SkipperConfig;
//!
//! # tokio_test::block_on(async {
//! let coordinator = PreferenceCoordinator::new(MemoryHost::new(), SkipperConfig::default());
//! let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! tx.send(BackgroundEvent::Installed(InstalledDetails::install())).unwrap();
//! drop(tx);
//! coordinator.run(rx).await;
//!
//! assert_eq!(coordinator.host().menu_items().len(), 1);
//! # });
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod coordinator;
mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use coordinator::{ClickOutcome, PreferenceCoordinator};
pub use event::BackgroundEvent;
