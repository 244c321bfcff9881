//! Type-safe identifiers for browser entities.
//!
//! Newtype wrappers keep tab ids and menu item ids from being mixed up with
//! other integers and strings crossing the host boundary.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// TabId
// ============================================================================

/// Browser tab identifier.
///
/// The host reports `-1` (`TAB_ID_NONE`) for contexts that are not tabs,
/// so only non-negative ids are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct TabId(u32);

impl TabId {
    /// Creates a tab id, returning `None` for `TAB_ID_NONE` and other
    /// out-of-range values.
    #[inline]
    #[must_use]
    pub fn new(id: i64) -> Option<Self> {
        u32::try_from(id).ok().map(Self)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for TabId {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("invalid tab id: {value}"))
    }
}

impl From<TabId> for u32 {
    #[inline]
    fn from(id: TabId) -> Self {
        id.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// MenuItemId
// ============================================================================

/// Context-menu item identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuItemId(String);

impl MenuItemId {
    /// Creates a menu item id.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
