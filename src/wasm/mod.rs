//! Browser bindings, compiled for `wasm32` only.
//!
//! | Item | Role |
//! |------|------|
//! | [`ChromeHost`] | `chrome.*` APIs behind the host traits |
//! | [`WebDocument`] | Live page behind [`Dom`](crate::content::Dom) |
//! | `start_background` / `start_content` | Exported entry points |

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_wasm_bindgen::{Serializer, from_value};
use wasm_bindgen::{JsCast, JsValue};

use crate::error::{Error, Result};

// ============================================================================
// Submodules
// ============================================================================

mod chrome;
mod document;
mod entry;

// ============================================================================
// Re-exports
// ============================================================================

pub use chrome::ChromeHost;
pub use document::WebDocument;
pub use entry::{start_background, start_content};

// ============================================================================
// Conversions
// ============================================================================

impl From<Error> for JsValue {
    fn from(error: Error) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}

/// Human-readable text of a thrown value or rejection reason.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Converts a Rust value into a plain JS value.
///
/// Maps become plain objects, which is what `chrome.*` expects.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| Error::protocol(e.to_string()))
}

/// Converts a plain JS value into a Rust value.
///
/// `undefined` reads as `None` or `null`.
pub(crate) fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T> {
    from_value(value.clone()).map_err(|e| Error::protocol(e.to_string()))
}
