//! Events delivered to the background coordinator.

use tokio::sync::mpsc;
use tracing::debug;

use crate::protocol::{ClickInfo, InstalledDetails, StorageArea, StorageChanges, TabInfo};

// ============================================================================
// BackgroundEvent
// ============================================================================

/// A host notification for the background context.
///
/// The host binding forwards each `chrome.*` listener invocation as one of
/// these over a channel consumed by
/// [`PreferenceCoordinator::run`](super::PreferenceCoordinator::run).
#[derive(Debug, Clone)]
pub enum BackgroundEvent {
    /// `runtime.onInstalled`.
    Installed(InstalledDetails),

    /// `runtime.onStartup`.
    Startup,

    /// `contextMenus.onClicked`.
    MenuClicked {
        /// Click data.
        info: ClickInfo,
        /// Tab the click came from, if any.
        tab: Option<TabInfo>,
    },

    /// `storage.onChanged`.
    StorageChanged {
        /// Changed keys.
        changes: StorageChanges,
        /// Area the change happened in.
        area: StorageArea,
    },
}

impl BackgroundEvent {
    /// Returns the host listener name, for logging.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Installed(_) => "runtime.onInstalled",
            Self::Startup => "runtime.onStartup",
            Self::MenuClicked { .. } => "contextMenus.onClicked",
            Self::StorageChanged { .. } => "storage.onChanged",
        }
    }

    /// Forwards this event to the coordinator's loop.
    ///
    /// Returns `false` if the loop has already exited. The event is dropped
    /// and the loss is logged.
    pub fn send_to(self, events: &mpsc::UnboundedSender<Self>) -> bool {
        let name = self.name();
        match events.send(self) {
            Ok(()) => true,
            Err(_) => {
                debug!(event = name, "Coordinator stopped, event dropped");
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_to_open_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(BackgroundEvent::Startup.send_to(&tx));
        assert!(matches!(rx.try_recv(), Ok(BackgroundEvent::Startup)));
    }

    #[test]
    fn test_send_to_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let event = BackgroundEvent::Installed(InstalledDetails::install());
        assert!(!event.send_to(&tx));
    }

    #[test]
    fn test_name_matches_listener() {
        assert_eq!(BackgroundEvent::Startup.name(), "runtime.onStartup");
        assert_eq!(
            BackgroundEvent::Installed(InstalledDetails::install()).name(),
            "runtime.onInstalled"
        );
    }
}
