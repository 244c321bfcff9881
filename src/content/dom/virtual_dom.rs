//! In-memory document.
//!
//! An arena of elements rooted at `<body>`, enough to reproduce the
//! player markup the interventionist works against. It counts structural
//! mutations (what a `MutationObserver` with `childList` would report) and
//! DOM writes separately, so callers can assert that a pass wrote nothing.
//!
//! # Example
//!
//! ```
//! use yt_ad_skipper::content::{Dom, VirtualDocument};
//!
//! let doc = VirtualDocument::new();
//! let player = doc.append_element(doc.body(), "div", &["html5-video-player", "ad-showing"]);
//! let video = doc.append_element(player, "video", &[]);
//! doc.set_media(video, 15.0);
//!
//! let found = doc.query_selector(".ad-showing video").unwrap();
//! assert_eq!(found, Some(video));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{Error, Result};

use super::selector::{ElementView, SelectorList};
use super::{ClickHandler, Dom};

// ============================================================================
// NodeId
// ============================================================================

/// Handle to an element in a [`VirtualDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

// ============================================================================
// Node Data
// ============================================================================

/// Playback state of a media element.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MediaState {
    duration: f64,
    position: f64,
}

#[derive(Debug, Clone, Default)]
struct NodeData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: FxHashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    media: Option<MediaState>,
    inner_html: Option<String>,
    clicks: u32,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }
}

impl ElementView for NodeData {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

// ============================================================================
// Tree
// ============================================================================

struct Tree {
    nodes: Vec<NodeData>,
    body: NodeId,
    handlers: FxHashMap<NodeId, ClickHandler>,
    /// Structural changes since the last `take_mutations`.
    pending_mutations: usize,
    /// Every write performed through [`Dom`].
    writes: usize,
}

impl Tree {
    fn new() -> Self {
        Self {
            nodes: vec![NodeData::element("body")],
            body: NodeId(0),
            handlers: FxHashMap::default(),
            pending_mutations: 0,
            writes: 0,
        }
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    fn is_connected(&self, mut id: NodeId) -> bool {
        loop {
            if id == self.body {
                return true;
            }
            match self.node(id).parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn ancestors(&self, id: NodeId) -> Vec<&NodeData> {
        let mut ancestors = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            let data = self.node(parent);
            ancestors.push(data);
            current = data.parent;
        }
        ancestors
    }

    /// Descendants of `scope` in document order, excluding `scope`.
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.node(scope).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    fn select_all(&self, scope: NodeId, include_scope: bool, selectors: &SelectorList) -> Vec<NodeId> {
        let mut candidates = Vec::new();
        if include_scope {
            candidates.push(scope);
        }
        candidates.extend(self.descendants(scope));

        candidates
            .into_iter()
            .filter(|&id| selectors.matches(self.node(id), self.ancestors(id)))
            .collect()
    }

    fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node_mut(id).parent.take() else {
            return false;
        };
        self.node_mut(parent).children.retain(|&child| child != id);
        true
    }

    fn deep_clone(&mut self, source: NodeId) -> NodeId {
        let original = self.node(source).clone();
        let copy = self.alloc(NodeData {
            parent: None,
            children: Vec::new(),
            media: None,
            clicks: 0,
            ..original.clone()
        });

        for child in original.children {
            let child_copy = self.deep_clone(child);
            self.node_mut(child_copy).parent = Some(copy);
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }
}

// ============================================================================
// VirtualDocument
// ============================================================================

/// Shared handle to an in-memory document.
///
/// Clones refer to the same document. Not `Send`: like a page, it belongs
/// to one thread.
#[derive(Clone)]
pub struct VirtualDocument {
    tree: Rc<RefCell<Tree>>,
}

impl Default for VirtualDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VirtualDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("VirtualDocument")
            .field("nodes", &tree.nodes.len())
            .field("pending_mutations", &tree.pending_mutations)
            .field("writes", &tree.writes)
            .finish_non_exhaustive()
    }
}

impl VirtualDocument {
    /// Creates a document containing an empty `<body>`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree::new())),
        }
    }

    /// Returns the `<body>` element.
    #[inline]
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.tree.borrow().body
    }
}

// ============================================================================
// VirtualDocument - Page Simulation
// ============================================================================

impl VirtualDocument {
    /// Appends a new element under `parent`, as the host page would.
    ///
    /// Counts as a mutation but not as a write.
    pub fn append_element(&self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let id = tree.alloc(NodeData {
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
            parent: Some(parent),
            ..NodeData::element(tag)
        });
        tree.node_mut(parent).children.push(id);
        tree.pending_mutations += 1;
        id
    }

    /// Turns `node` into a media element with `duration` seconds.
    pub fn set_media(&self, node: NodeId, duration: f64) {
        self.tree.borrow_mut().node_mut(node).media = Some(MediaState {
            duration,
            position: 0.0,
        });
    }

    /// Removes `node` from the tree, as the host page would.
    pub fn detach(&self, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if tree.detach(node) {
            tree.pending_mutations += 1;
        }
    }

    /// Adds or removes a class, as the host page would.
    pub fn toggle_class(&self, node: NodeId, class: &str, present: bool) {
        let mut tree = self.tree.borrow_mut();
        let classes = &mut tree.node_mut(node).classes;
        classes.retain(|c| c != class);
        if present {
            classes.push(class.to_string());
        }
    }

    /// Returns and resets the number of structural mutations.
    pub fn take_mutations(&self) -> usize {
        std::mem::take(&mut self.tree.borrow_mut().pending_mutations)
    }
}

// ============================================================================
// VirtualDocument - Inspection
// ============================================================================

impl VirtualDocument {
    /// Number of writes performed through [`Dom`].
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.tree.borrow().writes
    }

    /// Playback position of a media element.
    #[must_use]
    pub fn media_position(&self, node: NodeId) -> Option<f64> {
        self.tree.borrow().node(node).media.map(|m| m.position)
    }

    /// Number of clicks dispatched on `node`.
    #[must_use]
    pub fn click_count(&self, node: NodeId) -> u32 {
        self.tree.borrow().node(node).clicks
    }

    /// Children of `node` in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.borrow().node(node).children.clone()
    }

    /// Lowercase tag name of `node`.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> String {
        self.tree.borrow().node(node).tag.clone()
    }

    /// Attribute value of `node`. `id` and `class` are included.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let data = tree.node(node);
        match name {
            "id" => data.id.clone(),
            "class" => (!data.classes.is_empty()).then(|| data.classes.join(" ")),
            _ => data.attributes.get(name).cloned(),
        }
    }

    /// Markup set through [`Dom::set_inner_html`].
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().node(node).inner_html.clone()
    }

    /// Returns `true` if `node` is attached under `<body>`.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.borrow().is_connected(node)
    }

    /// Number of attached elements matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dom`] for unsupported selectors.
    pub fn count(&self, selector: &str) -> Result<usize> {
        let selectors = SelectorList::parse(selector)?;
        let tree = self.tree.borrow();
        Ok(tree.select_all(tree.body, true, &selectors).len())
    }
}

// ============================================================================
// Dom Implementation
// ============================================================================

impl Dom for VirtualDocument {
    type Node = NodeId;

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let selectors = SelectorList::parse(selector)?;
        let tree = self.tree.borrow();
        Ok(tree.select_all(tree.body, true, &selectors).into_iter().next())
    }

    fn query_selector_in(&self, scope: &NodeId, selector: &str) -> Result<Option<NodeId>> {
        let selectors = SelectorList::parse(selector)?;
        let tree = self.tree.borrow();
        Ok(tree.select_all(*scope, false, &selectors).into_iter().next())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        std::iter::once(tree.body)
            .chain(tree.descendants(tree.body))
            .find(|&node| tree.node(node).id.as_deref() == Some(id))
    }

    fn media_duration(&self, node: &NodeId) -> Option<f64> {
        self.tree.borrow().node(*node).media.map(|m| m.duration)
    }

    fn set_media_position(&self, node: &NodeId, seconds: f64) -> Result<()> {
        let mut tree = self.tree.borrow_mut();
        let media = tree
            .node_mut(*node)
            .media
            .as_mut()
            .ok_or_else(|| Error::dom(format!("{node} is not a media element")))?;

        media.position = seconds;
        tree.writes += 1;
        Ok(())
    }

    fn click(&self, node: &NodeId) {
        let handler = {
            let mut tree = self.tree.borrow_mut();
            tree.node_mut(*node).clicks += 1;
            tree.writes += 1;
            tree.handlers.get(node).cloned()
        };

        // The handler may use this document, so the borrow is released first.
        if let Some(handler) = handler {
            trace!(%node, "Running click handler");
            handler();
        }
    }

    fn create_element(&self, tag: &str) -> Result<NodeId> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(Error::dom(format!("invalid tag name: {tag:?}")));
        }
        Ok(self.tree.borrow_mut().alloc(NodeData::element(tag)))
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<()> {
        let mut tree = self.tree.borrow_mut();
        let data = tree.node_mut(*node);
        match name {
            "id" => data.id = Some(value.to_string()),
            "class" => data.classes = value.split_whitespace().map(str::to_string).collect(),
            _ => {
                data.attributes.insert(name.to_string(), value.to_string());
            }
        }
        tree.writes += 1;
        Ok(())
    }

    fn append_clone(&self, parent: &NodeId, source: &NodeId) -> Result<()> {
        let mut tree = self.tree.borrow_mut();
        let copy = tree.deep_clone(*source);
        tree.node_mut(copy).parent = Some(*parent);
        tree.node_mut(*parent).children.push(copy);

        if tree.is_connected(*parent) {
            tree.pending_mutations += 1;
        }
        tree.writes += 1;
        Ok(())
    }

    fn set_inner_html(&self, node: &NodeId, html: &str) -> Result<()> {
        let mut tree = self.tree.borrow_mut();
        let children = std::mem::take(&mut tree.node_mut(*node).children);
        for child in children {
            tree.node_mut(child).parent = None;
        }
        tree.node_mut(*node).inner_html = Some(html.to_string());

        if tree.is_connected(*node) {
            tree.pending_mutations += 1;
        }
        tree.writes += 1;
        Ok(())
    }

    fn insert_before(&self, parent: &NodeId, node: &NodeId, reference: &NodeId) -> Result<()> {
        let mut tree = self.tree.borrow_mut();

        if tree.node(*reference).parent != Some(*parent) {
            return Err(Error::dom(format!(
                "{reference} is not a child of {parent}"
            )));
        }

        tree.detach(*node);
        let index = tree
            .node(*parent)
            .children
            .iter()
            .position(|child| child == reference)
            .ok_or_else(|| Error::dom(format!("{reference} vanished from {parent}")))?;

        tree.node_mut(*parent).children.insert(index, *node);
        tree.node_mut(*node).parent = Some(*parent);

        if tree.is_connected(*parent) {
            tree.pending_mutations += 1;
        }
        tree.writes += 1;
        Ok(())
    }

    fn set_click_handler(&self, node: &NodeId, handler: ClickHandler) -> Result<()> {
        let mut tree = self.tree.borrow_mut();
        tree.handlers.insert(*node, handler);
        tree.writes += 1;
        Ok(())
    }

    fn remove(&self, node: &NodeId) {
        let mut tree = self.tree.borrow_mut();
        let was_connected = tree.is_connected(*node);
        if tree.detach(*node) {
            if was_connected {
                tree.pending_mutations += 1;
            }
            tree.writes += 1;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
