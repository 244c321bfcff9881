//! Error types for the ad skipper.
//!
//! Nothing in the extension is fatal: event loops log these errors and keep
//! running, and the next mutation tick or page load corrects any state that
//! a failed call left behind.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Host APIs | [`Error::Host`], [`Error::NoReceiver`] |
//! | Page | [`Error::Dom`] |
//! | Wire | [`Error::Protocol`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::TabId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when [`SkipperConfig::validate`](crate::SkipperConfig::validate) rejects a field.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Host Errors
    // ========================================================================
    /// A host extension API call failed.
    #[error("Host API {api} failed: {message}")]
    Host {
        /// API that failed, e.g. `storage.sync.get`.
        api: String,
        /// Message reported by the host.
        message: String,
    },

    /// No content script is listening in the target tab.
    ///
    /// Expected while a page is still loading.
    #[error("No receiver in tab {tab_id}")]
    NoReceiver {
        /// Tab the message was addressed to.
        tab_id: TabId,
    },

    // ========================================================================
    // Page Errors
    // ========================================================================
    /// A DOM operation failed.
    #[error("DOM error: {message}")]
    Dom {
        /// Description of the failed operation.
        message: String,
    },

    // ========================================================================
    // Wire Errors
    // ========================================================================
    /// Payload did not match the expected shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the mismatch.
        message: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a host API error.
    #[inline]
    pub fn host(api: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Host {
            api: api.into(),
            message: message.into(),
        }
    }

    /// Creates a no-receiver error.
    #[inline]
    pub fn no_receiver(tab_id: TabId) -> Self {
        Self::NoReceiver { tab_id }
    }

    /// Creates a DOM error.
    #[inline]
    pub fn dom(message: impl Into<String>) -> Self {
        Self::Dom {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if a host extension API produced this error.
    #[inline]
    #[must_use]
    pub fn is_host_error(&self) -> bool {
        matches!(self, Self::Host { .. } | Self::NoReceiver { .. })
    }

    /// Returns `true` if the condition clears on its own.
    ///
    /// A missing receiver or DOM node is a transient page state that the
    /// next page load or mutation tick resolves.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoReceiver { .. } | Self::Dom { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
