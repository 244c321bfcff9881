//! Tab and lifecycle payloads delivered to background listeners.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use url::Url;

use crate::identifiers::TabId;

// ============================================================================
// TabInfo
// ============================================================================

/// The subset of `tabs.Tab` the coordinator reads.
///
/// Both fields may be missing: `url` requires the `tabs` permission or a
/// host match, and the id is `-1` for non-tab contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    /// Raw tab id as reported by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Current URL of the tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl TabInfo {
    /// Creates tab info with an id and URL.
    #[must_use]
    pub fn new(id: i64, url: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            url: Some(url.into()),
        }
    }

    /// Returns the validated tab id.
    #[inline]
    #[must_use]
    pub fn tab_id(&self) -> Option<TabId> {
        self.id.and_then(TabId::new)
    }

    /// Returns `true` if the tab's URL host is `site` or one of its
    /// subdomains.
    ///
    /// `www.youtube.com` and `m.youtube.com` match `youtube.com`;
    /// `notyoutube.com` does not. Hosts compare case-insensitively.
    #[must_use]
    pub fn is_on_site(&self, site: &str) -> bool {
        let Some(url) = self.url.as_deref().and_then(|raw| Url::parse(raw).ok()) else {
            return false;
        };

        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return false;
        };
        let site = site.to_ascii_lowercase();

        host == site
            || host
                .strip_suffix(site.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Why `runtime.onInstalled` fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallReason {
    /// Fresh install.
    Install,
    /// Extension updated to a new version.
    Update,
    /// Browser updated.
    ChromeUpdate,
    /// A shared module this extension depends on updated.
    SharedModuleUpdate,
}

/// Data delivered to `runtime.onInstalled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledDetails {
    /// Install reason.
    pub reason: InstallReason,

    /// Version before an update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
}

impl InstalledDetails {
    /// Details for a fresh install.
    #[inline]
    #[must_use]
    pub fn install() -> Self {
        Self {
            reason: InstallReason::Install,
            previous_version: None,
        }
    }

    /// Details for an update from `previous_version`.
    #[inline]
    #[must_use]
    pub fn update(previous_version: impl Into<String>) -> Self {
        Self {
            reason: InstallReason::Update,
            previous_version: Some(previous_version.into()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_match() {
        let site = "youtube.com";

        assert!(TabInfo::new(1, "https://www.youtube.com/watch?v=abc").is_on_site(site));
        assert!(TabInfo::new(1, "https://youtube.com/").is_on_site(site));
        assert!(TabInfo::new(1, "https://m.youtube.com/").is_on_site(site));
        assert!(!TabInfo::new(1, "https://notyoutube.com/").is_on_site(site));
        assert!(!TabInfo::new(1, "https://example.com/?q=youtube.com").is_on_site(site));
        assert!(!TabInfo::new(1, "not a url").is_on_site(site));
        assert!(!TabInfo::default().is_on_site(site));
    }

    #[test]
    fn test_site_match_ignores_case() {
        let site = "YouTube.com";

        assert!(TabInfo::new(1, "https://youtube.com/").is_on_site(site));
        assert!(TabInfo::new(1, "https://www.youtube.com/watch?v=abc").is_on_site(site));
        assert!(TabInfo::new(1, "https://M.YOUTUBE.COM/").is_on_site(site));
        assert!(!TabInfo::new(1, "https://notyoutube.com/").is_on_site(site));
    }

    #[test]
    fn test_tab_id_none() {
        let tab: TabInfo = serde_json::from_value(json!({ "id": -1 })).expect("parse");
        assert!(tab.tab_id().is_none());
    }

    #[test]
    fn test_installed_details_parse() {
        let details: InstalledDetails = serde_json::from_value(json!({
            "reason": "update",
            "previousVersion": "1.0.0"
        }))
        .expect("parse");

        assert_eq!(details, InstalledDetails::update("1.0.0"));
    }
}
