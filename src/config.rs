//! Extension configuration.
//!
//! Defaults target YouTube's player markup. The extension glue may pass a
//! JSON object to override any field, which keeps selector changes on the
//! host page a configuration edit rather than a rebuild.
//!
//! # Example
//!
//! ```
//! use yt_ad_skipper::SkipperConfig;
//!
//! let config = SkipperConfig::new()
//!     .with_site("youtube.com")
//!     .with_follow_storage_changes(false);
//!
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifiers::MenuItemId;
use crate::preference::PREFERENCE_KEY;
use crate::protocol::{MenuContext, MenuItem, StorageArea};

// ============================================================================
// Constants
// ============================================================================

/// Site the extension acts on.
pub const DEFAULT_SITE: &str = "youtube.com";

/// Id of the toggle menu item.
pub const DEFAULT_MENU_ITEM_ID: &str = "toggleManualSkipButton";

/// Label of the toggle menu item.
pub const DEFAULT_MENU_TITLE: &str = "Show Manual Skip Button";

/// Id of the injected button, used as the presence guard.
pub const DEFAULT_BUTTON_ID: &str = "skipper-manual-force-skip-button";

/// Icon used when the player's next-button graphic is unavailable.
pub const FALLBACK_ICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100%" height="100%" viewBox="0 0 36 36" fill="white"><path d="M10 10v16l12-8zM22 10v16h2V10z"/></svg>"#;

// ============================================================================
// Selectors
// ============================================================================

/// CSS selectors forming the contract with the host page's markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    /// Marker present on the player while an ad plays.
    pub ad_container: String,
    /// Video element inside the ad container.
    pub ad_video: String,
    /// Native skip-ad control.
    pub native_skip_button: String,
    /// Parent the manual button is inserted into.
    pub right_controls: String,
    /// Sibling the manual button is inserted before.
    pub settings_button: String,
    /// Graphic cloned into the manual button.
    pub next_button_icon: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            ad_container: ".ad-showing".to_string(),
            ad_video: "video".to_string(),
            native_skip_button: ".ytp-ad-skip-button, .ytp-ad-skip-button-modern".to_string(),
            right_controls: ".ytp-right-controls".to_string(),
            settings_button: ".ytp-settings-button".to_string(),
            next_button_icon: ".ytp-next-button svg".to_string(),
        }
    }
}

impl Selectors {
    fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("adContainer", self.ad_container.as_str()),
            ("adVideo", self.ad_video.as_str()),
            ("nativeSkipButton", self.native_skip_button.as_str()),
            ("rightControls", self.right_controls.as_str()),
            ("settingsButton", self.settings_button.as_str()),
            ("nextButtonIcon", self.next_button_icon.as_str()),
        ]
    }
}

// ============================================================================
// ButtonSpec
// ============================================================================

/// Appearance of the injected manual skip button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonSpec {
    /// Element id.
    pub id: String,
    /// Class list; `ytp-button` picks up the player's own styling.
    pub class_name: String,
    /// Tooltip.
    pub title: String,
    /// Inline SVG used when no icon can be cloned.
    pub fallback_icon: String,
}

impl Default for ButtonSpec {
    fn default() -> Self {
        Self {
            id: DEFAULT_BUTTON_ID.to_string(),
            class_name: "ytp-button".to_string(),
            title: "Force Skip Ad".to_string(),
            fallback_icon: FALLBACK_ICON_SVG.to_string(),
        }
    }
}

// ============================================================================
// MenuConfig
// ============================================================================

/// The toggle entry in the toolbar action's context menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuConfig {
    /// Item id.
    pub id: MenuItemId,
    /// Item label.
    pub title: String,
    /// Contexts the item is shown in.
    pub contexts: Vec<MenuContext>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            id: MenuItemId::new(DEFAULT_MENU_ITEM_ID),
            title: DEFAULT_MENU_TITLE.to_string(),
            contexts: vec![MenuContext::Action],
        }
    }
}

impl MenuConfig {
    /// Builds the checkbox item with the given checked state.
    #[must_use]
    pub fn item(&self, checked: bool) -> MenuItem {
        MenuItem::checkbox(self.id.clone(), self.title.clone(), checked)
            .with_contexts(self.contexts.iter().copied())
    }
}

// ============================================================================
// SkipperConfig
// ============================================================================

/// Configuration shared by the background and content programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkipperConfig {
    /// Host (and its subdomains) that receives toggle notifications.
    pub site: String,

    /// Storage area holding the preference.
    pub storage_area: StorageArea,

    /// Preference key within the storage area.
    pub preference_key: String,

    /// Toggle menu entry.
    pub menu: MenuConfig,

    /// Page markup contract.
    pub selectors: Selectors,

    /// Injected button appearance.
    pub button: ButtonSpec,

    /// Let pages apply storage change notifications in addition to the
    /// background's push message.
    pub follow_storage_changes: bool,
}

impl Default for SkipperConfig {
    fn default() -> Self {
        Self {
            site: DEFAULT_SITE.to_string(),
            storage_area: StorageArea::Sync,
            preference_key: PREFERENCE_KEY.to_string(),
            menu: MenuConfig::default(),
            selectors: Selectors::default(),
            button: ButtonSpec::default(),
            follow_storage_changes: true,
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl SkipperConfig {
    /// Creates the default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON override. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed input and [`Error::Config`]
    /// if the result fails [`validate`](Self::validate).
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SkipperConfig {
    /// Sets the target site host.
    #[inline]
    #[must_use]
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    /// Sets the storage area.
    #[inline]
    #[must_use]
    pub fn with_storage_area(mut self, area: StorageArea) -> Self {
        self.storage_area = area;
        self
    }

    /// Replaces the page selectors.
    #[inline]
    #[must_use]
    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Replaces the button appearance.
    #[inline]
    #[must_use]
    pub fn with_button(mut self, button: ButtonSpec) -> Self {
        self.button = button;
        self
    }

    /// Replaces the menu entry.
    #[inline]
    #[must_use]
    pub fn with_menu(mut self, menu: MenuConfig) -> Self {
        self.menu = menu;
        self
    }

    /// Enables or disables applying storage change notifications in pages.
    #[inline]
    #[must_use]
    pub fn with_follow_storage_changes(mut self, follow: bool) -> Self {
        self.follow_storage_changes = follow;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl SkipperConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        if self.site.trim().is_empty() {
            return Err(Error::config("site must not be empty"));
        }

        if self.site.contains('/') || self.site.contains(':') {
            return Err(Error::config(format!(
                "site must be a bare host, got {:?}",
                self.site
            )));
        }

        if self.preference_key.is_empty() {
            return Err(Error::config("preferenceKey must not be empty"));
        }

        if self.menu.id.as_str().is_empty() {
            return Err(Error::config("menu.id must not be empty"));
        }

        if self.button.id.is_empty() {
            return Err(Error::config("button.id must not be empty"));
        }

        if let Some((name, _)) = self
            .selectors
            .fields()
            .into_iter()
            .find(|(_, selector)| selector.trim().is_empty())
        {
            return Err(Error::config(format!("selectors.{name} must not be empty")));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_player_markup() {
        let config = SkipperConfig::default();

        assert_eq!(config.site, "youtube.com");
        assert_eq!(config.storage_area, StorageArea::Sync);
        assert_eq!(config.preference_key, "manualSkipButtonEnabled");
        assert_eq!(config.button.id, "skipper-manual-force-skip-button");
        assert_eq!(config.selectors.ad_container, ".ad-showing");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_menu_item_from_config() {
        let item = MenuConfig::default().item(false);

        assert_eq!(item.id.as_str(), "toggleManualSkipButton");
        assert_eq!(item.title, "Show Manual Skip Button");
        assert!(!item.checked);
        assert_eq!(item.contexts, vec![MenuContext::Action]);
    }

    #[test]
    fn test_from_json_partial_override() {
        let config = SkipperConfig::from_json(
            r#"{ "selectors": { "adContainer": ".ad-interrupting" }, "followStorageChanges": false }"#,
        )
        .expect("parse");

        assert_eq!(config.selectors.ad_container, ".ad-interrupting");
        assert_eq!(config.selectors.ad_video, "video");
        assert!(!config.follow_storage_changes);
        assert_eq!(config.site, "youtube.com");
    }

    #[test]
    fn test_validate_rejects_empty_selector() {
        let selectors = Selectors {
            right_controls: " ".to_string(),
            ..Selectors::default()
        };
        let err = SkipperConfig::new()
            .with_selectors(selectors)
            .validate()
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: selectors.rightControls must not be empty"
        );
    }

    #[test]
    fn test_validate_rejects_url_as_site() {
        let config = SkipperConfig::new().with_site("https://youtube.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_malformed() {
        let err = SkipperConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
