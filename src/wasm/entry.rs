//! Exported entry points.
//!
//! The extension's JS glue loads the module and calls one of these
//! synchronously during the first evaluation of its script, so that every
//! listener is registered before the browser dispatches events to it.

// ============================================================================
// Imports
// ============================================================================

use std::rc::Rc;

use js_sys::{Array, Function};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_extensions_sys::chrome;
use web_sys::{MutationObserver, MutationObserverInit};

use crate::background::{BackgroundEvent, PreferenceCoordinator};
use crate::config::SkipperConfig;
use crate::content::PageInterventionist;
use crate::error::{Error, Result};
use crate::protocol::{ClickInfo, InstalledDetails, StorageArea, StorageChanges, TabInfo};

use super::{ChromeHost, WebDocument, describe, from_js, to_js};

// ============================================================================
// Setup
// ============================================================================

fn init_runtime() {
    console_error_panic_hook::set_once();
    // Both programs may share one module instance in tests.
    let _ = tracing_wasm::try_set_as_global_default();
}

fn load_config(raw: Option<String>) -> Result<SkipperConfig> {
    match raw {
        Some(raw) => SkipperConfig::from_json(&raw),
        None => Ok(SkipperConfig::default()),
    }
}

fn storage_area(name: &JsValue) -> Option<StorageArea> {
    name.as_string().as_deref().and_then(StorageArea::from_name)
}

fn register(host: &ChromeHost, path: &[&str], callback: &JsValue) -> Result<()> {
    host.add_listener(path, callback.unchecked_ref::<Function>())
}

// ============================================================================
// Background
// ============================================================================

/// Starts the preference coordinator in the extension's service worker.
///
/// `config_json` optionally overrides [`SkipperConfig`] fields.
///
/// # Errors
///
/// Throws if the configuration is invalid or a listener cannot be
/// registered.
#[wasm_bindgen]
pub fn start_background(config_json: Option<String>) -> std::result::Result<(), JsValue> {
    init_runtime();
    let config = load_config(config_json)?;
    let host = ChromeHost::new()?;
    let (events, rx) = mpsc::unbounded_channel::<BackgroundEvent>();

    let tx = events.clone();
    let on_installed = Closure::<dyn FnMut(JsValue)>::new(move |details: JsValue| {
        match from_js::<InstalledDetails>(&details) {
            Ok(details) => {
                BackgroundEvent::Installed(details).send_to(&tx);
            }
            Err(e) => warn!(error = %e, "Malformed onInstalled details"),
        }
    });
    register(&host, &["runtime", "onInstalled"], on_installed.as_ref())?;
    on_installed.forget();

    let tx = events.clone();
    let on_startup = Closure::<dyn FnMut()>::new(move || {
        BackgroundEvent::Startup.send_to(&tx);
    });
    register(&host, &["runtime", "onStartup"], on_startup.as_ref())?;
    on_startup.forget();

    let tx = events.clone();
    let on_clicked = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |info: JsValue, tab: JsValue| {
        let info = match from_js::<ClickInfo>(&info) {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "Malformed menu click");
                return;
            }
        };
        let tab = from_js::<Option<TabInfo>>(&tab).unwrap_or_default();
        BackgroundEvent::MenuClicked { info, tab }.send_to(&tx);
    });
    register(&host, &["contextMenus", "onClicked"], on_clicked.as_ref())?;
    on_clicked.forget();

    let tx = events;
    let on_changed = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
        let Some(area) = storage_area(&area) else {
            return;
        };
        match from_js::<StorageChanges>(&changes) {
            Ok(changes) => {
                BackgroundEvent::StorageChanged { changes, area }.send_to(&tx);
            }
            Err(e) => warn!(error = %e, "Malformed storage change"),
        }
    });
    register(&host, &["storage", "onChanged"], on_changed.as_ref())?;
    on_changed.forget();

    let coordinator = PreferenceCoordinator::new(host, config);
    spawn_local(async move { coordinator.run(rx).await });

    info!("Background listeners registered");
    Ok(())
}

// ============================================================================
// Content
// ============================================================================

/// Starts the page interventionist in a content script.
///
/// `config_json` optionally overrides [`SkipperConfig`] fields.
///
/// # Errors
///
/// Throws if the configuration is invalid, the page has no document, or
/// the observer cannot be attached.
#[wasm_bindgen]
pub fn start_content(config_json: Option<String>) -> std::result::Result<(), JsValue> {
    init_runtime();
    let config = load_config(config_json)?;
    let follow_storage_changes = config.follow_storage_changes;
    let host = Rc::new(ChromeHost::new()?);
    let document = WebDocument::from_window()?;
    let root = document.observe_root()?;
    let page = Rc::new(PageInterventionist::new(document, config));

    // The response must be sent before the listener returns, so messages
    // are handled in place rather than queued.
    let handler = Rc::clone(&page);
    let on_message = Closure::<dyn FnMut(JsValue, JsValue, Function) -> JsValue>::new(
        move |message: JsValue, _sender: JsValue, send_response: Function| {
            let raw = match from_js::<Value>(&message) {
                Ok(raw) => raw,
                Err(e) => {
                    debug!(error = %e, "Unreadable message");
                    return JsValue::FALSE;
                }
            };

            if let Some(ack) = handler.handle_message(raw) {
                match to_js(&ack) {
                    Ok(reply) => {
                        if let Err(e) = send_response.call1(&JsValue::UNDEFINED, &reply) {
                            debug!(error = %describe(&e), "sendResponse failed");
                        }
                    }
                    Err(e) => warn!(error = %e, "Acknowledgement not serializable"),
                }
            }
            JsValue::FALSE
        },
    );
    chrome()
        .runtime()
        .on_message()
        .add_listener(on_message.as_ref().unchecked_ref());
    on_message.forget();

    if follow_storage_changes {
        let handler = Rc::clone(&page);
        let on_changed =
            Closure::<dyn FnMut(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
                let Some(area) = storage_area(&area) else {
                    return;
                };
                match from_js::<StorageChanges>(&changes) {
                    Ok(changes) => {
                        handler.handle_storage_changed(&changes, area);
                    }
                    Err(e) => warn!(error = %e, "Malformed storage change"),
                }
            });
        register(&host, &["storage", "onChanged"], on_changed.as_ref())?;
        on_changed.forget();
    }

    let handler = Rc::clone(&page);
    let on_mutations = Closure::<dyn FnMut(Array)>::new(move |records: Array| {
        handler.on_mutations(records.length() as usize);
    });
    let observer = MutationObserver::new(on_mutations.as_ref().unchecked_ref())
        .map_err(|e| Error::dom(describe(&e)))?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer
        .observe_with_options(&root, &options)
        .map_err(|e| Error::dom(describe(&e)))?;
    // Observes for the page lifetime.
    on_mutations.forget();
    info!("Mutation observer active");

    spawn_local(async move {
        if let Err(e) = page.initialize(host.as_ref()).await {
            warn!(error = %e, "Preference not loaded, keeping default");
        }
    });

    Ok(())
}
