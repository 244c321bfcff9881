//! Context-menu item shapes (`chrome.contextMenus`).

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::MenuItemId;

// ============================================================================
// Enums
// ============================================================================

/// Menu item kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemType {
    /// Plain entry.
    #[default]
    Normal,
    /// Entry with a checkmark toggled on click.
    Checkbox,
    /// Entry in a mutually exclusive group.
    Radio,
    /// Divider line.
    Separator,
}

/// Where a menu item appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuContext {
    /// Every context.
    All,
    /// Page background.
    Page,
    /// Text selection.
    Selection,
    /// Links.
    Link,
    /// Video elements.
    Video,
    /// The extension's toolbar action.
    Action,
}

// ============================================================================
// MenuItem
// ============================================================================

/// Properties passed to `contextMenus.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Unique item id.
    pub id: MenuItemId,

    /// Label shown to the user.
    pub title: String,

    /// Item kind.
    #[serde(rename = "type")]
    pub item_type: MenuItemType,

    /// Checked state for checkbox and radio items.
    pub checked: bool,

    /// Contexts the item is shown in.
    pub contexts: Vec<MenuContext>,
}

impl MenuItem {
    /// Creates a checkbox item shown on the toolbar action.
    #[must_use]
    pub fn checkbox(id: MenuItemId, title: impl Into<String>, checked: bool) -> Self {
        Self {
            id,
            title: title.into(),
            item_type: MenuItemType::Checkbox,
            checked,
            contexts: vec![MenuContext::Action],
        }
    }

    /// Replaces the contexts the item is shown in.
    #[inline]
    #[must_use]
    pub fn with_contexts(mut self, contexts: impl IntoIterator<Item = MenuContext>) -> Self {
        self.contexts = contexts.into_iter().collect();
        self
    }
}

// ============================================================================
// MenuItemUpdate
// ============================================================================

/// Properties passed to `contextMenus.update`. Unset fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    /// New checked state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,

    /// New label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MenuItemUpdate {
    /// Creates an update that only changes the checked state.
    #[inline]
    #[must_use]
    pub fn checked(checked: bool) -> Self {
        Self {
            checked: Some(checked),
            title: None,
        }
    }
}

// ============================================================================
// ClickInfo
// ============================================================================

/// Data delivered to `contextMenus.onClicked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInfo {
    /// Clicked item.
    pub menu_item_id: MenuItemId,

    /// Checked state after the click (checkbox and radio items only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,

    /// Checked state before the click.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_checked: Option<bool>,
}

impl ClickInfo {
    /// Creates click info for a checkbox toggled to `checked`.
    #[must_use]
    pub fn checkbox(menu_item_id: MenuItemId, checked: bool) -> Self {
        Self {
            menu_item_id,
            checked: Some(checked),
            was_checked: Some(!checked),
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
    fn test_checkbox_item_format() {
        let item = MenuItem::checkbox(
            MenuItemId::new("toggleManualSkipButton"),
            "Show Manual Skip Button",
            true,
        );

        let value = serde_json::to_value(&item).expect("serialize");
        assert_eq!(
            value,
            json!({
                "id": "toggleManualSkipButton",
                "title": "Show Manual Skip Button",
                "type": "checkbox",
                "checked": true,
                "contexts": ["action"]
            })
        );
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let json = serde_json::to_string(&MenuItemUpdate::checked(false)).expect("serialize");
        assert_eq!(json, r#"{"checked":false}"#);
    }

    #[test]
    fn test_click_info_parse() {
        let info: ClickInfo = serde_json::from_value(json!({
            "menuItemId": "toggleManualSkipButton",
            "checked": false,
            "wasChecked": true,
            "editable": false
        }))
        .expect("parse");

        assert_eq!(info.menu_item_id.as_str(), "toggleManualSkipButton");
        assert_eq!(info.checked, Some(false));
    }
}
