//! Background → content notification types.
//!
//! # Format
//!
//! ```json
//! { "action": "toggleManualSkipButton", "enabled": false }
//! ```
//!
//! The content side answers with `{ "success": true }`.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// ContentMessage
// ============================================================================

/// Notification pushed from the background context to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ContentMessage {
    /// Show or hide the manual skip button.
    #[serde(rename = "toggleManualSkipButton")]
    ToggleManualSkipButton {
        /// New preference value.
        enabled: bool,
    },
}

impl ContentMessage {
    /// Creates a toggle notification.
    #[inline]
    #[must_use]
    pub const fn toggle(enabled: bool) -> Self {
        Self::ToggleManualSkipButton { enabled }
    }

    /// Parses a raw runtime message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for unknown actions or a missing
    /// `enabled` flag.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::protocol(e.to_string()))
    }

    /// Returns the action name.
    #[inline]
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::ToggleManualSkipButton { .. } => "toggleManualSkipButton",
        }
    }
}

// ============================================================================
// MessageAck
// ============================================================================

/// Acknowledgement returned by the content receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAck {
    /// Always `true` for handled messages.
    pub success: bool,
}

impl MessageAck {
    /// Successful acknowledgement.
    pub const OK: Self = Self { success: true };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toggle_wire_format() {
        let value = serde_json::to_value(ContentMessage::toggle(false)).expect("serialize");
        assert_eq!(
            value,
            json!({ "action": "toggleManualSkipButton", "enabled": false })
        );
    }

    #[test]
    fn test_from_value() {
        let msg = ContentMessage::from_value(json!({
            "action": "toggleManualSkipButton",
            "enabled": true
        }))
        .expect("parse");

        assert_eq!(msg, ContentMessage::toggle(true));
        assert_eq!(msg.action(), "toggleManualSkipButton");
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = ContentMessage::from_value(json!({ "action": "ping" })).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_missing_enabled_rejected() {
        let result = ContentMessage::from_value(json!({ "action": "toggleManualSkipButton" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_ack_format() {
        let json = serde_json::to_string(&MessageAck::OK).expect("serialize");
        assert_eq!(json, r#"{"success":true}"#);
    }
}
