//! Page session state.

use std::cell::Cell;

use crate::preference::DEFAULT_ENABLED;

/// Per-page copy of the preference.
///
/// Starts enabled and is seeded from storage once at load. Every later
/// change goes through [`set_manual_skip_button_enabled`].
///
/// [`set_manual_skip_button_enabled`]: SessionState::set_manual_skip_button_enabled
#[derive(Debug)]
pub struct SessionState {
    manual_skip_button_enabled: Cell<bool>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            manual_skip_button_enabled: Cell::new(DEFAULT_ENABLED),
        }
    }
}

impl SessionState {
    /// Whether the manual skip button should be shown.
    #[inline]
    #[must_use]
    pub fn manual_skip_button_enabled(&self) -> bool {
        self.manual_skip_button_enabled.get()
    }

    /// Stores a new value and returns the previous one.
    #[inline]
    pub fn set_manual_skip_button_enabled(&self, enabled: bool) -> bool {
        self.manual_skip_button_enabled.replace(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enabled() {
        assert!(SessionState::default().manual_skip_button_enabled());
    }

    #[test]
    fn test_setter_returns_previous() {
        let state = SessionState::default();

        assert!(state.set_manual_skip_button_enabled(false));
        assert!(!state.set_manual_skip_button_enabled(false));
        assert!(!state.manual_skip_button_enabled());
    }
}
