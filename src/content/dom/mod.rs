//! DOM access for the page program.
//!
//! [`Dom`] covers exactly the reads and writes the interventionist performs.
//! [`VirtualDocument`] implements it in memory; the wasm build adds a
//! `web-sys` implementation over the live page.

// ============================================================================
// Imports
// ============================================================================

use std::rc::Rc;

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// CSS selector parsing and matching.
pub mod selector;

/// In-memory document.
pub mod virtual_dom;

// ============================================================================
// Re-exports
// ============================================================================

pub use selector::SelectorList;
pub use virtual_dom::{NodeId, VirtualDocument};

// ============================================================================
// Types
// ============================================================================

/// Click callback attached to an injected element.
pub type ClickHandler = Rc<dyn Fn()>;

// ============================================================================
// Dom
// ============================================================================

/// A document the interventionist can query and mutate.
///
/// Handles are cheap clones of the same underlying document. Query
/// methods return `Ok(None)` when nothing matches and `Err` only for a
/// selector the document cannot parse.
pub trait Dom: Clone + 'static {
    /// Element handle.
    type Node: Clone + 'static;

    /// First element in the document matching `selector`.
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Node>>;

    /// First descendant of `scope` matching `selector`.
    fn query_selector_in(&self, scope: &Self::Node, selector: &str) -> Result<Option<Self::Node>>;

    /// Element with the given `id`, if attached to the document.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Duration in seconds if `node` is a media element.
    ///
    /// May be `NaN` before metadata loads or infinite for live streams.
    fn media_duration(&self, node: &Self::Node) -> Option<f64>;

    /// Sets a media element's playback position.
    fn set_media_position(&self, node: &Self::Node, seconds: f64) -> Result<()>;

    /// Dispatches a click on `node`.
    fn click(&self, node: &Self::Node);

    /// Creates a detached element.
    fn create_element(&self, tag: &str) -> Result<Self::Node>;

    /// Sets an attribute (`id`, `class`, `title`, ...).
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    /// Deep-clones `source` and appends the copy to `parent`.
    fn append_clone(&self, parent: &Self::Node, source: &Self::Node) -> Result<()>;

    /// Replaces the children of `node` with parsed `html`.
    fn set_inner_html(&self, node: &Self::Node, html: &str) -> Result<()>;

    /// Inserts `node` into `parent` immediately before `reference`.
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: &Self::Node) -> Result<()>;

    /// Replaces the click handler of `node`.
    fn set_click_handler(&self, node: &Self::Node, handler: ClickHandler) -> Result<()>;

    /// Detaches `node` from its parent. No-op if already detached.
    fn remove(&self, node: &Self::Node);
}
