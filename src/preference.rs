//! The single persisted preference.
//!
//! Both programs resolve a missing value to enabled: only an explicitly
//! stored `false` turns the manual skip button off.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::host::PreferenceStore;
use crate::protocol::{StorageArea, StorageChanges, StorageItems};

// ============================================================================
// Constants
// ============================================================================

/// Storage key of the manual skip button toggle.
pub const PREFERENCE_KEY: &str = "manualSkipButtonEnabled";

/// Value used when nothing is stored.
pub const DEFAULT_ENABLED: bool = true;

// ============================================================================
// SkipperPreference
// ============================================================================

/// Whether the manual skip button is shown in the player controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipperPreference {
    /// Show the manual skip button.
    pub manual_skip_button_enabled: bool,
}

impl Default for SkipperPreference {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_ENABLED)
    }
}

impl SkipperPreference {
    /// Creates a preference with an explicit value.
    #[inline]
    #[must_use]
    pub const fn new(manual_skip_button_enabled: bool) -> Self {
        Self {
            manual_skip_button_enabled,
        }
    }

    /// Resolves a raw stored value.
    ///
    /// `false` only for an explicit JSON `false`; missing, `null` and
    /// non-boolean values resolve to [`DEFAULT_ENABLED`].
    #[inline]
    #[must_use]
    pub fn resolve(value: Option<&Value>) -> bool {
        !matches!(value, Some(Value::Bool(false)))
    }

    /// Reads the preference from storage items.
    #[must_use]
    pub fn from_items(items: &StorageItems, key: &str) -> Self {
        Self::new(Self::resolve(items.get(key)))
    }

    /// Reads the new value from a change notification.
    ///
    /// Returns `None` if `key` did not change. A removed key resolves to
    /// the default.
    #[must_use]
    pub fn from_changes(changes: &StorageChanges, key: &str) -> Option<Self> {
        changes
            .get(key)
            .map(|change| Self::new(Self::resolve(change.new_value.as_ref())))
    }

    /// Converts to storage items for a write.
    #[must_use]
    pub fn to_items(&self, key: &str) -> StorageItems {
        let mut items = StorageItems::new();
        items.insert(key.to_string(), Value::Bool(self.manual_skip_button_enabled));
        items
    }

    /// Returns `true` if the manual skip button is shown.
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.manual_skip_button_enabled
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// Reads the preference, defaulting when nothing is stored.
///
/// # Errors
///
/// Propagates the store's [`Error::Host`](crate::Error::Host).
pub async fn load_preference<S>(store: &S, area: StorageArea, key: &str) -> Result<SkipperPreference>
where
    S: PreferenceStore + ?Sized,
{
    let items = store.get(area, &[key]).await?;
    let preference = SkipperPreference::from_items(&items, key);

    debug!(
        area = area.as_str(),
        key,
        stored = items.contains_key(key),
        enabled = preference.is_enabled(),
        "Loaded preference"
    );
    Ok(preference)
}

/// Writes the preference.
///
/// # Errors
///
/// Propagates the store's [`Error::Host`](crate::Error::Host).
pub async fn save_preference<S>(
    store: &S,
    area: StorageArea,
    key: &str,
    preference: SkipperPreference,
) -> Result<()>
where
    S: PreferenceStore + ?Sized,
{
    debug!(area = area.as_str(), key, enabled = preference.is_enabled(), "Saving preference");
    store.set(area, preference.to_items(key)).await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::protocol::StorageChange;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_default_is_enabled() {
        assert!(SkipperPreference::default().is_enabled());
        assert!(SkipperPreference::resolve(None));
        assert!(SkipperPreference::resolve(Some(&Value::Null)));
        assert!(!SkipperPreference::resolve(Some(&json!(false))));
    }

    #[test]
    fn test_from_changes() {
        let mut changes = StorageChanges::default();
        changes.insert(
            PREFERENCE_KEY.to_string(),
            StorageChange::new(Some(json!(true)), Some(json!(false))),
        );

        assert_eq!(
            SkipperPreference::from_changes(&changes, PREFERENCE_KEY),
            Some(SkipperPreference::new(false))
        );
        assert_eq!(SkipperPreference::from_changes(&changes, "other"), None);
    }

    #[test]
    fn test_removed_key_resolves_to_default() {
        let mut changes = StorageChanges::default();
        changes.insert(
            PREFERENCE_KEY.to_string(),
            StorageChange::new(Some(json!(false)), None),
        );

        assert_eq!(
            SkipperPreference::from_changes(&changes, PREFERENCE_KEY),
            Some(SkipperPreference::new(true))
        );
    }

    #[test]
    fn test_to_items() {
        let items = SkipperPreference::new(false).to_items(PREFERENCE_KEY);
        assert_eq!(items.get(PREFERENCE_KEY), Some(&json!(false)));
    }

    #[tokio::test]
    async fn test_load_missing_defaults_to_enabled() {
        let host = MemoryHost::new();

        let preference = load_preference(&host, StorageArea::Sync, PREFERENCE_KEY)
            .await
            .expect("load");
        assert!(preference.is_enabled());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let host = MemoryHost::new();

        save_preference(
            &host,
            StorageArea::Sync,
            PREFERENCE_KEY,
            SkipperPreference::new(false),
        )
        .await
        .expect("save");

        let preference = load_preference(&host, StorageArea::Sync, PREFERENCE_KEY)
            .await
            .expect("load");
        assert!(!preference.is_enabled());
        assert_eq!(
            host.stored(StorageArea::Sync, PREFERENCE_KEY),
            Some(json!(false))
        );
    }

    proptest! {
        #[test]
        fn prop_only_explicit_false_disables(n in any::<i64>(), s in ".*", b in any::<bool>()) {
            prop_assert!(SkipperPreference::resolve(Some(&json!(n))));
            prop_assert!(SkipperPreference::resolve(Some(&json!(s))));
            prop_assert_eq!(SkipperPreference::resolve(Some(&json!(b))), b);
        }
    }
}
