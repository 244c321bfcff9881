//! In-memory host.
//!
//! Behaves like the browser where it matters to callers: storage emits a
//! change notification only when a value actually changes, creating a menu
//! item with an existing id fails, and messages to a tab with no listener
//! fail with [`Error::NoReceiver`].
//!
//! # Example
//!
//! ```
//! use yt_ad_skipper::host::{MemoryHost, PreferenceStore};
//! use yt_ad_skipper::protocol::StorageArea;
//!
//! # tokio_test::block_on(async {
//! let host = MemoryHost::new();
//! let items = host.get(StorageArea::Sync, &["manualSkipButtonEnabled"]).await?;
//! assert!(items.is_empty());
//! # Ok::<(), yt_ad_skipper::Error>(())
//! # }).expect("example");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::{MenuItemId, TabId};
use crate::protocol::{
    ContentMessage, MenuItem, MenuItemUpdate, MessageAck, StorageArea, StorageChange,
    StorageChanges, StorageItems,
};

use super::{ContextMenus, PreferenceStore, TabMessenger};

// ============================================================================
// Types
// ============================================================================

/// Storage change notification: area plus changed keys.
pub type StorageNotification = (StorageArea, StorageChanges);

/// Shared state behind every clone of a [`MemoryHost`].
#[derive(Default)]
struct MemoryHostInner {
    /// Stored items by area.
    storage: Mutex<FxHashMap<StorageArea, StorageItems>>,
    /// Storage change subscribers.
    watchers: Mutex<Vec<mpsc::UnboundedSender<StorageNotification>>>,
    /// Menu items in creation order.
    menus: Mutex<Vec<MenuItem>>,
    /// Content listeners by tab.
    tabs: Mutex<FxHashMap<TabId, mpsc::UnboundedSender<ContentMessage>>>,
    /// Every message delivered, in order.
    sent: Mutex<Vec<(TabId, ContentMessage)>>,
}

// ============================================================================
// MemoryHost
// ============================================================================

/// Host services backed by in-process maps and channels.
///
/// Clones share state, so one clone can act as the background's host while
/// another plays an external actor editing storage.
#[derive(Clone, Default)]
pub struct MemoryHost {
    inner: Arc<MemoryHostInner>,
}

impl MemoryHost {
    /// Creates an empty host.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// MemoryHost - Subscriptions
// ============================================================================

impl MemoryHost {
    /// Subscribes to storage change notifications (`storage.onChanged`).
    #[must_use]
    pub fn subscribe_storage(&self) -> mpsc::UnboundedReceiver<StorageNotification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.watchers.lock().push(tx);
        rx
    }

    /// Registers a content listener for `tab_id` (`runtime.onMessage`).
    ///
    /// Replaces any earlier listener, as a page reload would.
    #[must_use]
    pub fn connect_tab(&self, tab_id: TabId) -> mpsc::UnboundedReceiver<ContentMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.tabs.lock().insert(tab_id, tx);
        debug!(%tab_id, "Tab listener connected");
        rx
    }

    /// Removes the content listener for `tab_id`.
    pub fn disconnect_tab(&self, tab_id: TabId) {
        if self.inner.tabs.lock().remove(&tab_id).is_some() {
            debug!(%tab_id, "Tab listener disconnected");
        }
    }
}

// ============================================================================
// MemoryHost - Inspection
// ============================================================================

impl MemoryHost {
    /// Returns the stored value for `key`.
    #[must_use]
    pub fn stored(&self, area: StorageArea, key: &str) -> Option<Value> {
        self.inner
            .storage
            .lock()
            .get(&area)
            .and_then(|items| items.get(key))
            .cloned()
    }

    /// Removes `key`, notifying subscribers if it existed.
    pub fn remove(&self, area: StorageArea, key: &str) {
        let old_value = self
            .inner
            .storage
            .lock()
            .get_mut(&area)
            .and_then(|items| items.remove(key));

        if let Some(old_value) = old_value {
            let mut changes = StorageChanges::default();
            changes.insert(key.to_string(), StorageChange::new(Some(old_value), None));
            self.notify(area, changes);
        }
    }

    /// Returns every menu item in creation order.
    #[must_use]
    pub fn menu_items(&self) -> Vec<MenuItem> {
        self.inner.menus.lock().clone()
    }

    /// Returns the menu item with `id`.
    #[must_use]
    pub fn menu_item(&self, id: &MenuItemId) -> Option<MenuItem> {
        self.inner
            .menus
            .lock()
            .iter()
            .find(|item| &item.id == id)
            .cloned()
    }

    /// Returns every message delivered so far.
    #[must_use]
    pub fn sent_messages(&self) -> Vec<(TabId, ContentMessage)> {
        self.inner.sent.lock().clone()
    }

    fn notify(&self, area: StorageArea, changes: StorageChanges) {
        trace!(area = area.as_str(), keys = changes.len(), "Storage changed");

        self.inner
            .watchers
            .lock()
            .retain(|tx| tx.send((area, changes.clone())).is_ok());
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

#[async_trait(?Send)]
impl PreferenceStore for MemoryHost {
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<StorageItems> {
        let storage = self.inner.storage.lock();
        let mut result = StorageItems::new();

        if let Some(items) = storage.get(&area) {
            for key in keys {
                if let Some(value) = items.get(*key) {
                    result.insert((*key).to_string(), value.clone());
                }
            }
        }

        Ok(result)
    }

    async fn set(&self, area: StorageArea, items: StorageItems) -> Result<()> {
        if area == StorageArea::Managed {
            return Err(Error::host(
                "storage.managed.set",
                "This is a read-only store",
            ));
        }

        let mut changes = StorageChanges::default();
        {
            let mut storage = self.inner.storage.lock();
            let stored = storage.entry(area).or_default();

            for (key, value) in items {
                let old_value = stored.insert(key.clone(), value.clone());
                if old_value.as_ref() != Some(&value) {
                    changes.insert(key, StorageChange::new(old_value, Some(value)));
                }
            }
        }

        if !changes.is_empty() {
            self.notify(area, changes);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl ContextMenus for MemoryHost {
    async fn remove_all(&self) -> Result<()> {
        self.inner.menus.lock().clear();
        Ok(())
    }

    async fn create(&self, item: MenuItem) -> Result<()> {
        let mut menus = self.inner.menus.lock();

        if menus.iter().any(|existing| existing.id == item.id) {
            return Err(Error::host(
                "contextMenus.create",
                format!("Cannot create item with duplicate id {}", item.id),
            ));
        }

        menus.push(item);
        Ok(())
    }

    async fn update(&self, id: &MenuItemId, update: MenuItemUpdate) -> Result<()> {
        let mut menus = self.inner.menus.lock();

        let item = menus
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| {
                Error::host(
                    "contextMenus.update",
                    format!("Cannot find menu item with id {id}"),
                )
            })?;

        if let Some(checked) = update.checked {
            item.checked = checked;
        }
        if let Some(title) = update.title {
            item.title = title;
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl TabMessenger for MemoryHost {
    async fn send_message(&self, tab_id: TabId, message: &ContentMessage) -> Result<MessageAck> {
        let mut tabs = self.inner.tabs.lock();

        let delivered = tabs
            .get(&tab_id)
            .is_some_and(|tx| tx.send(*message).is_ok());

        if !delivered {
            tabs.remove(&tab_id);
            return Err(Error::no_receiver(tab_id));
        }

        self.inner.sent.lock().push((tab_id, *message));
        Ok(MessageAck::OK)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MenuItem;
    use serde_json::json;

    fn items(key: &str, value: Value) -> StorageItems {
        let mut items = StorageItems::new();
        items.insert(key.to_string(), value);
        items
    }

    #[tokio::test]
    async fn test_set_notifies_only_on_change() {
        let host = MemoryHost::new();
        let mut changes = host.subscribe_storage();

        host.set(StorageArea::Sync, items("k", json!(true)))
            .await
            .expect("set");
        host.set(StorageArea::Sync, items("k", json!(true)))
            .await
            .expect("set");

        let (area, first) = changes.try_recv().expect("first change");
        assert_eq!(area, StorageArea::Sync);
        assert_eq!(first["k"].new_value, Some(json!(true)));
        assert!(first["k"].old_value.is_none());
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_areas_are_separate() {
        let host = MemoryHost::new();
        host.set(StorageArea::Local, items("k", json!(false)))
            .await
            .expect("set");

        let sync = host.get(StorageArea::Sync, &["k"]).await.expect("get");
        assert!(sync.is_empty());
        assert_eq!(host.stored(StorageArea::Local, "k"), Some(json!(false)));
    }

    #[tokio::test]
    async fn test_managed_is_read_only() {
        let host = MemoryHost::new();
        let err = host
            .set(StorageArea::Managed, items("k", json!(1)))
            .await
            .unwrap_err();
        assert!(err.is_host_error());
    }

    #[tokio::test]
    async fn test_remove_notifies() {
        let host = MemoryHost::new();
        host.set(StorageArea::Sync, items("k", json!(false)))
            .await
            .expect("set");
        let mut changes = host.subscribe_storage();

        host.remove(StorageArea::Sync, "k");

        let (_, removed) = changes.try_recv().expect("change");
        assert_eq!(removed["k"].old_value, Some(json!(false)));
        assert!(removed["k"].new_value.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_menu_id_rejected() {
        let host = MemoryHost::new();
        let item = MenuItem::checkbox(MenuItemId::new("a"), "A", true);

        host.create(item.clone()).await.expect("create");
        assert!(host.create(item.clone()).await.is_err());

        host.remove_all().await.expect("remove_all");
        host.create(item).await.expect("create after clear");
        assert_eq!(host.menu_items().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let host = MemoryHost::new();
        let result = host
            .update(&MenuItemId::new("missing"), MenuItemUpdate::checked(true))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_message_without_listener() {
        let host = MemoryHost::new();
        let tab_id = TabId::new(3).expect("valid tab id");

        let err = host
            .send_message(tab_id, &ContentMessage::toggle(true))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoReceiver { .. }));
        assert!(host.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_message_delivery() {
        let host = MemoryHost::new();
        let tab_id = TabId::new(3).expect("valid tab id");
        let mut inbox = host.connect_tab(tab_id);

        let ack = host
            .send_message(tab_id, &ContentMessage::toggle(false))
            .await
            .expect("send");

        assert!(ack.success);
        assert_eq!(inbox.try_recv().ok(), Some(ContentMessage::toggle(false)));
    }

    #[tokio::test]
    async fn test_dropped_listener_is_no_receiver() {
        let host = MemoryHost::new();
        let tab_id = TabId::new(3).expect("valid tab id");
        drop(host.connect_tab(tab_id));

        let result = host.send_message(tab_id, &ContentMessage::toggle(true)).await;
        assert!(matches!(result, Err(Error::NoReceiver { .. })));
    }

    #[tokio::test]
    async fn test_disconnected_tab_is_no_receiver() {
        let host = MemoryHost::new();
        let tab_id = TabId::new(3).expect("valid tab id");
        let _inbox = host.connect_tab(tab_id);

        host.disconnect_tab(tab_id);

        let result = host.send_message(tab_id, &ContentMessage::toggle(true)).await;
        assert!(matches!(result, Err(Error::NoReceiver { tab_id: id }) if id == tab_id));
        assert!(host.sent_messages().is_empty());
    }
}
