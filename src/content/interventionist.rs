//! Page interventionist: per-tick ad skipping and button reconciliation.

// ============================================================================
// Imports
// ============================================================================

use std::cell::Cell;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::config::SkipperConfig;
use crate::error::Result;
use crate::host::PreferenceStore;
use crate::preference::{SkipperPreference, load_preference};
use crate::protocol::{ContentMessage, MessageAck, StorageArea, StorageChanges};

use super::button::{self, Reconcile};
use super::dom::Dom;
use super::event::PageEvent;
use super::session::SessionState;
use super::skip::{self, SkipOutcome};

// ============================================================================
// TickReport
// ============================================================================

/// What one mutation tick did. A concern that failed is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Ad-skip result.
    pub skip: Option<SkipOutcome>,
    /// Button reconciliation result.
    pub button: Option<Reconcile>,
}

// ============================================================================
// PageInterventionist
// ============================================================================

/// Reacts to page mutations and preference changes inside one page.
///
/// Every tick re-evaluates the whole page: both concerns look up what they
/// need from scratch and only write when the page differs from what they
/// want, so ticks can be repeated or interleaved with messages freely.
pub struct PageInterventionist<D> {
    dom: D,
    config: SkipperConfig,
    session: SessionState,
    ticks: Cell<u64>,
}

impl<D> PageInterventionist<D>
where
    D: Dom,
{
    /// Creates an interventionist over `dom` with the preference enabled.
    #[must_use]
    pub fn new(dom: D, config: SkipperConfig) -> Self {
        Self {
            dom,
            config,
            session: SessionState::default(),
            ticks: Cell::new(0),
        }
    }

    /// Returns the document.
    #[inline]
    #[must_use]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Returns the session state.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SkipperConfig {
        &self.config
    }

    /// Number of mutation ticks handled so far.
    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }
}

// ============================================================================
// PageInterventionist - Concerns
// ============================================================================

impl<D> PageInterventionist<D>
where
    D: Dom,
{
    /// Runs the ad-skip concern once.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::Dom`](crate::Error::Dom).
    pub fn force_skip_ad(&self) -> Result<SkipOutcome> {
        skip::force_skip_ad(&self.dom, &self.config.selectors)
    }

    /// Runs the button concern once against the session state.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::Dom`](crate::Error::Dom).
    pub fn reconcile_button(&self) -> Result<Reconcile> {
        button::reconcile_button(
            &self.dom,
            &self.config.selectors,
            &self.config.button,
            self.session.manual_skip_button_enabled(),
        )
    }

    /// Handles one mutation batch by running both concerns.
    ///
    /// The concerns are independent: a failure in one is logged and does
    /// not stop the other.
    pub fn on_mutations(&self, records: usize) -> TickReport {
        let tick = self.ticks.get() + 1;
        self.ticks.set(tick);
        trace!(tick, records, "Mutation tick");

        let skip = self
            .force_skip_ad()
            .inspect_err(|e| warn!(tick, error = %e, "Ad skip failed"))
            .ok();

        let button = self
            .reconcile_button()
            .inspect_err(|e| warn!(tick, error = %e, "Button reconcile failed"))
            .ok();

        TickReport { skip, button }
    }

    /// Stores a new preference value and reconciles the button right away,
    /// without waiting for the next mutation.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::Dom`](crate::Error::Dom) from reconciliation.
    pub fn apply_preference(&self, enabled: bool) -> Result<Reconcile> {
        let previous = self.session.set_manual_skip_button_enabled(enabled);
        if previous != enabled {
            info!(enabled, "Manual skip button preference changed");
        }
        self.reconcile_button()
    }
}

// ============================================================================
// PageInterventionist - Preference Sources
// ============================================================================

impl<D> PageInterventionist<D>
where
    D: Dom,
{
    /// Seeds the session from storage, once per page load.
    ///
    /// A stray button left over from an earlier session is removed when the
    /// preference is off. Returns the loaded value.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`Error::Host`](crate::Error::Host); the
    /// session then keeps its default.
    pub async fn initialize<S>(&self, store: &S) -> Result<bool>
    where
        S: PreferenceStore + ?Sized,
    {
        let preference = load_preference(
            store,
            self.config.storage_area,
            &self.config.preference_key,
        )
        .await?;

        let enabled = preference.is_enabled();
        self.session.set_manual_skip_button_enabled(enabled);
        if !enabled {
            button::remove_manual_skip_button(&self.dom, &self.config.button);
        }

        info!(enabled, "Page session initialized");
        Ok(enabled)
    }

    /// Handles a raw runtime message.
    ///
    /// Returns the acknowledgement for a toggle and `None` for anything
    /// else, which leaves the sender without a response.
    pub fn handle_message(&self, raw: Value) -> Option<MessageAck> {
        match ContentMessage::from_value(raw) {
            Ok(message) => Some(self.handle_content_message(message)),
            Err(e) => {
                debug!(error = %e, "Ignoring unrecognized message");
                None
            }
        }
    }

    /// Handles a parsed runtime message.
    pub fn handle_content_message(&self, message: ContentMessage) -> MessageAck {
        match message {
            ContentMessage::ToggleManualSkipButton { enabled } => {
                if let Err(e) = self.apply_preference(enabled) {
                    warn!(action = message.action(), error = %e, "Button reconcile failed");
                }
                MessageAck::OK
            }
        }
    }

    /// Handles a storage change notification.
    ///
    /// Only applied when [`SkipperConfig::follow_storage_changes`] is set
    /// and the change concerns the preference key. Returns the
    /// reconciliation result when applied.
    pub fn handle_storage_changed(
        &self,
        changes: &StorageChanges,
        area: StorageArea,
    ) -> Option<Reconcile> {
        if !self.config.follow_storage_changes || area != self.config.storage_area {
            return None;
        }

        let preference = SkipperPreference::from_changes(changes, &self.config.preference_key)?;
        self.apply_preference(preference.is_enabled())
            .inspect_err(|e| warn!(error = %e, "Button reconcile failed"))
            .ok()
    }
}

// ============================================================================
// PageInterventionist - Event Loop
// ============================================================================

impl<D> PageInterventionist<D>
where
    D: Dom,
{
    /// Dispatches one event.
    pub fn handle_event(&self, event: PageEvent) {
        match event {
            PageEvent::Mutations { records } => {
                self.on_mutations(records);
            }
            PageEvent::Message { message, reply } => {
                if let Some(ack) = self.handle_message(message)
                    && let Some(reply) = reply
                    && reply.send(ack).is_err()
                {
                    debug!("Message sender stopped waiting");
                }
            }
            PageEvent::StorageChanged { changes, area } => {
                self.handle_storage_changed(&changes, area);
            }
        }
    }

    /// Processes events until every sender is dropped.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<PageEvent>) {
        info!(site = %self.config.site, "Page interventionist running");

        while let Some(event) = events.recv().await {
            trace!(event = event.name(), "Page event");
            self.handle_event(event);
        }

        debug!(ticks = self.ticks.get(), "Page interventionist stopped");
    }
}

// ============================================================================
// Tests
// ============================================================================
