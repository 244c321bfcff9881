//! Storage area and change-notification types.
//!
//! Mirrors the shapes of `chrome.storage`: items are a flat JSON object and
//! change notifications carry `{ oldValue, newValue }` per key.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// StorageArea
// ============================================================================

/// Storage namespace (`chrome.storage.<area>`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Synchronized across the user's signed-in browsers.
    #[default]
    Sync,
    /// Local to this browser profile.
    Local,
    /// In-memory for the browser session.
    Session,
    /// Read-only, set by enterprise policy.
    Managed,
}

impl StorageArea {
    /// Returns the area name as used by the host API.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Local => "local",
            Self::Session => "session",
            Self::Managed => "managed",
        }
    }

    /// Parses an area name reported by `storage.onChanged`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sync" => Some(Self::Sync),
            "local" => Some(Self::Local),
            "session" => Some(Self::Session),
            "managed" => Some(Self::Managed),
            _ => None,
        }
    }
}

// ============================================================================
// Items & Changes
// ============================================================================

/// Key-value items as read from or written to a storage area.
pub type StorageItems = Map<String, Value>;

/// Changed keys mapped to their old and new values.
pub type StorageChanges = FxHashMap<String, StorageChange>;

/// A single key's change.
///
/// `new_value` is `None` when the key was removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    /// Value before the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,

    /// Value after the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

impl StorageChange {
    /// Creates a change record.
    #[inline]
    #[must_use]
    pub fn new(old_value: Option<Value>, new_value: Option<Value>) -> Self {
        Self {
            old_value,
            new_value,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
