//! Content context: the page interventionist.
//!
//! Runs inside every page of the target site. Two concerns execute on each
//! DOM mutation batch:
//!
//! - **Ad skip**: while the player is marked as showing an ad, move the ad
//!   video to its end and press the native skip control.
//! - **Manual button**: keep a "Force Skip Ad" button in the player controls
//!   while the preference is on, and keep it out while it is off.
//!
//! Preference changes pushed from the background apply immediately, without
//! waiting for the next mutation.
//!
//! # Example
//!
//! ```
//! use yt_ad_skipper::content::{PageInterventionist, VirtualDocument};
//! use yt_ad_skipper::SkipperConfig;
//!
//! let doc = VirtualDocument::new();
//! let player = doc.append_element(doc.body(), "div", &["html5-video-player"]);
//! let controls = doc.append_element(player, "div", &["ytp-right-controls"]);
//! doc.append_element(controls, "button", &["ytp-settings-button"]);
//!
//! let page = PageInterventionist::new(doc.clone(), SkipperConfig::default());
//! page.on_mutations(doc.take_mutations());
//!
//! assert_eq!(doc.count("#skipper-manual-force-skip-button").unwrap(), 1);
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// DOM abstraction and the in-memory document.
pub mod dom;

mod button;
mod event;
mod interventionist;
mod session;
mod skip;

// ============================================================================
// Re-exports
// ============================================================================

pub use button::{Reconcile, insert_manual_skip_button, reconcile_button, remove_manual_skip_button};
pub use dom::{ClickHandler, Dom, NodeId, SelectorList, VirtualDocument};
pub use event::PageEvent;
pub use interventionist::{PageInterventionist, TickReport};
pub use session::SessionState;
pub use skip::{SkipOutcome, force_skip_ad};
