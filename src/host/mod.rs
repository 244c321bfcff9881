//! Host extension platform seams.
//!
//! The browser provides storage, context menus and tab messaging; this
//! crate only calls them. Each service is a trait so the coordinator and
//! the page program can run against the real `chrome.*` APIs on `wasm32`
//! or against [`MemoryHost`] in tests and benchmarks.
//!
//! Browser contexts are single-threaded, so host futures are not `Send`.
//!
//! # Traits
//!
//! | Trait | Host API |
//! |-------|----------|
//! | [`PreferenceStore`] | `chrome.storage.<area>.get/set` |
//! | [`ContextMenus`] | `chrome.contextMenus.removeAll/create/update` |
//! | [`TabMessenger`] | `chrome.tabs.sendMessage` |

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::Result;
use crate::identifiers::{MenuItemId, TabId};
use crate::protocol::{ContentMessage, MenuItem, MenuItemUpdate, MessageAck, StorageArea, StorageItems};

// ============================================================================
// Submodules
// ============================================================================

/// In-memory host implementation.
pub mod memory;

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::MemoryHost;

// ============================================================================
// Traits
// ============================================================================

/// Persistent key-value storage with per-area namespaces.
///
/// Change notifications are delivered separately as events.
#[async_trait(?Send)]
pub trait PreferenceStore {
    /// Reads `keys` from `area`. Missing keys are absent from the result.
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<StorageItems>;

    /// Writes `items` into `area`.
    async fn set(&self, area: StorageArea, items: StorageItems) -> Result<()>;
}

/// Context-menu registry.
#[async_trait(?Send)]
pub trait ContextMenus {
    /// Removes every item this extension created.
    async fn remove_all(&self) -> Result<()>;

    /// Creates an item. Fails if the id already exists.
    async fn create(&self, item: MenuItem) -> Result<()>;

    /// Updates an existing item.
    async fn update(&self, id: &MenuItemId, update: MenuItemUpdate) -> Result<()>;
}

/// Delivery of runtime messages to a tab's content program.
#[async_trait(?Send)]
pub trait TabMessenger {
    /// Sends `message` to `tab_id`.
    ///
    /// # Errors
    ///
    /// [`Error::NoReceiver`](crate::Error::NoReceiver) when no content
    /// program is listening in the tab.
    async fn send_message(&self, tab_id: TabId, message: &ContentMessage) -> Result<MessageAck>;
}

/// Everything the background coordinator needs from the host.
pub trait BackgroundHost: PreferenceStore + ContextMenus + TabMessenger {}

impl<T> BackgroundHost for T where T: PreferenceStore + ContextMenus + TabMessenger {}
