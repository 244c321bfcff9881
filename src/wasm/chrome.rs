//! Host traits over the `chrome.*` extension APIs.
//!
//! Calls go through `Reflect` so the same binary works wherever the
//! `chrome` global exists, without generated bindings per API.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use tracing::{debug, trace};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::{Error, Result};
use crate::host::{ContextMenus, PreferenceStore, TabMessenger};
use crate::identifiers::{MenuItemId, TabId};
use crate::protocol::{ContentMessage, MenuItem, MenuItemUpdate, MessageAck, StorageArea, StorageItems};

use super::{describe, from_js, to_js};

// ============================================================================
// Constants
// ============================================================================

/// Rejection text when the target tab has no message listener.
const NO_RECEIVER: &str = "Receiving end does not exist";

// ============================================================================
// ChromeHost
// ============================================================================

/// Handle to the `chrome` global.
#[derive(Debug, Clone)]
pub struct ChromeHost {
    chrome: JsValue,
}

impl ChromeHost {
    /// Looks up the `chrome` global.
    ///
    /// # Errors
    ///
    /// [`Error::Host`] outside an extension context.
    pub fn new() -> Result<Self> {
        let chrome = Reflect::get(&js_sys::global(), &JsValue::from_str("chrome"))
            .map_err(|e| Error::host("chrome", describe(&e)))?;

        if chrome.is_undefined() || chrome.is_null() {
            return Err(Error::host("chrome", "not running in an extension context"));
        }
        Ok(Self { chrome })
    }

    /// Resolves a dotted API path such as `["storage", "sync"]`.
    fn api(&self, path: &[&str]) -> Result<JsValue> {
        path.iter().try_fold(self.chrome.clone(), |object, name| {
            let value = Reflect::get(&object, &JsValue::from_str(name))
                .map_err(|e| Error::host(path.join("."), describe(&e)))?;
            if value.is_undefined() {
                return Err(Error::host(path.join("."), "API not available"));
            }
            Ok(value)
        })
    }

    /// Calls `method` on the object at `path`, awaiting a returned promise.
    async fn call(&self, path: &[&str], method: &str, args: &Array) -> Result<JsValue> {
        let api = format!("{}.{method}", path.join("."));
        let target = self.api(path)?;
        let function: Function = Reflect::get(&target, &JsValue::from_str(method))
            .map_err(|e| Error::host(api.as_str(), describe(&e)))?
            .dyn_into()
            .map_err(|_| Error::host(api.as_str(), "not a function"))?;

        trace!(api = %api, "Calling host API");
        let result = Reflect::apply(&function, &target, args)
            .map_err(|e| Error::host(api.as_str(), describe(&e)))?;

        match result.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .map_err(|e| Error::host(api.as_str(), describe(&e))),
            Err(value) => Ok(value),
        }
    }

    /// Registers `callback` on the event object at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::Host`] if the event does not exist.
    pub fn add_listener(&self, path: &[&str], callback: &Function) -> Result<()> {
        let event = self.api(path)?;
        let add: Function = Reflect::get(&event, &JsValue::from_str("addListener"))
            .map_err(|e| Error::host(path.join("."), describe(&e)))?
            .dyn_into()
            .map_err(|_| Error::host(path.join("."), "addListener is not a function"))?;

        add.call1(&event, callback)
            .map_err(|e| Error::host(path.join("."), describe(&e)))?;

        debug!(event = %path.join("."), "Listener registered");
        Ok(())
    }
}

// ============================================================================
// PreferenceStore
// ============================================================================

#[async_trait(?Send)]
impl PreferenceStore for ChromeHost {
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<StorageItems> {
        let keys: Array = keys.iter().map(|key| JsValue::from_str(key)).collect();
        let items = self
            .call(&["storage", area.as_str()], "get", &Array::of1(&keys))
            .await?;
        from_js(&items)
    }

    async fn set(&self, area: StorageArea, items: StorageItems) -> Result<()> {
        let items = to_js(&items)?;
        self.call(&["storage", area.as_str()], "set", &Array::of1(&items))
            .await?;
        Ok(())
    }
}

// ============================================================================
// ContextMenus
// ============================================================================

#[async_trait(?Send)]
impl ContextMenus for ChromeHost {
    async fn remove_all(&self) -> Result<()> {
        self.call(&["contextMenus"], "removeAll", &Array::new())
            .await?;
        Ok(())
    }

    async fn create(&self, item: MenuItem) -> Result<()> {
        // Returns the id synchronously; failures surface via lastError.
        let properties = to_js(&item)?;
        self.call(&["contextMenus"], "create", &Array::of1(&properties))
            .await?;
        Ok(())
    }

    async fn update(&self, id: &MenuItemId, update: MenuItemUpdate) -> Result<()> {
        let properties = to_js(&update)?;
        self.call(
            &["contextMenus"],
            "update",
            &Array::of2(&JsValue::from_str(id.as_str()), &properties),
        )
        .await?;
        Ok(())
    }
}

// ============================================================================
// TabMessenger
// ============================================================================

#[async_trait(?Send)]
impl TabMessenger for ChromeHost {
    async fn send_message(&self, tab_id: TabId, message: &ContentMessage) -> Result<MessageAck> {
        let payload = to_js(message)?;
        let args = Array::of2(&JsValue::from(tab_id.as_u32()), &payload);

        let response = match self.call(&["tabs"], "sendMessage", &args).await {
            Ok(response) => response,
            Err(Error::Host { message, .. }) if message.contains(NO_RECEIVER) => {
                return Err(Error::no_receiver(tab_id));
            }
            Err(e) => return Err(e),
        };

        if response.is_undefined() {
            return Err(Error::protocol("listener closed without a response"));
        }
        from_js(&response)
    }
}
