//! Events delivered to the page interventionist.

use serde_json::Value;
use tokio::sync::oneshot;

use crate::protocol::{MessageAck, StorageArea, StorageChanges};

// ============================================================================
// PageEvent
// ============================================================================

/// A page-side notification.
#[derive(Debug)]
pub enum PageEvent {
    /// A `MutationObserver` batch.
    Mutations {
        /// Number of records in the batch.
        records: usize,
    },

    /// `runtime.onMessage`.
    Message {
        /// Raw message payload.
        message: Value,
        /// Where to send the acknowledgement, if the sender waits for one.
        reply: Option<oneshot::Sender<MessageAck>>,
    },

    /// `storage.onChanged`.
    StorageChanged {
        /// Changed keys.
        changes: StorageChanges,
        /// Area the change happened in.
        area: StorageArea,
    },
}

impl PageEvent {
    /// Returns the source name, for logging.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mutations { .. } => "MutationObserver",
            Self::Message { .. } => "runtime.onMessage",
            Self::StorageChanged { .. } => "storage.onChanged",
        }
    }
}
