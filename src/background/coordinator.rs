//! Preference coordinator: menu checkbox, persistence and page fan-out.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SkipperConfig;
use crate::error::{Error, Result};
use crate::host::BackgroundHost;
use crate::preference::{SkipperPreference, load_preference, save_preference};
use crate::protocol::{
    ClickInfo, ContentMessage, InstallReason, InstalledDetails, MenuItemUpdate, StorageArea,
    StorageChanges, TabInfo,
};

use super::BackgroundEvent;

// ============================================================================
// ClickOutcome
// ============================================================================

/// What a menu click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click was for another menu item.
    Ignored,
    /// The preference was stored.
    Toggled {
        /// New preference value.
        enabled: bool,
        /// Whether the originating tab acknowledged the push.
        notified: bool,
    },
}

// ============================================================================
// PreferenceCoordinator
// ============================================================================

/// Owns the manual skip button preference in the background context.
///
/// Storage is the source of truth; the menu checkbox mirrors it and pages
/// receive a push on every user toggle.
pub struct PreferenceCoordinator<H> {
    host: H,
    config: SkipperConfig,
}

impl<H> PreferenceCoordinator<H>
where
    H: BackgroundHost,
{
    /// Creates a coordinator over `host`.
    #[must_use]
    pub fn new(host: H, config: SkipperConfig) -> Self {
        Self { host, config }
    }

    /// Returns the host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SkipperConfig {
        &self.config
    }

    fn area(&self) -> StorageArea {
        self.config.storage_area
    }

    fn key(&self) -> &str {
        &self.config.preference_key
    }
}

// ============================================================================
// PreferenceCoordinator - Lifecycle
// ============================================================================

impl<H> PreferenceCoordinator<H>
where
    H: BackgroundHost,
{
    /// Handles `runtime.onInstalled`.
    ///
    /// A fresh install stores the default and shows the item checked. Updates
    /// keep whatever the user chose and only rebuild the menu.
    pub async fn handle_installed(&self, details: &InstalledDetails) -> Result<()> {
        info!(
            reason = ?details.reason,
            previous_version = details.previous_version.as_deref().unwrap_or("-"),
            "Extension installed/updated"
        );

        let preference = match details.reason {
            InstallReason::Install => {
                let preference = SkipperPreference::default();
                save_preference(&self.host, self.area(), self.key(), preference).await?;
                preference
            }
            _ => load_preference(&self.host, self.area(), self.key()).await?,
        };

        self.rebuild_menu(preference.is_enabled()).await
    }

    /// Handles `runtime.onStartup`: rebuilds the menu from storage.
    pub async fn handle_startup(&self) -> Result<()> {
        let preference = load_preference(&self.host, self.area(), self.key()).await?;
        debug!(enabled = preference.is_enabled(), "Restoring menu on startup");
        self.rebuild_menu(preference.is_enabled()).await
    }

    /// Replaces every menu entry with the single toggle checkbox.
    ///
    /// Safe to call repeatedly: clearing first keeps ids unique.
    pub async fn rebuild_menu(&self, checked: bool) -> Result<()> {
        self.host.remove_all().await?;
        self.host.create(self.config.menu.item(checked)).await?;

        debug!(id = %self.config.menu.id, checked, "Menu rebuilt");
        Ok(())
    }
}

// ============================================================================
// PreferenceCoordinator - Toggle
// ============================================================================

impl<H> PreferenceCoordinator<H>
where
    H: BackgroundHost,
{
    /// Handles `contextMenus.onClicked`.
    ///
    /// Stores the new checked state, then pushes it to the originating tab
    /// when that tab is on the target site. Push failures are expected (the
    /// page may not have loaded its content program yet) and ignored; the
    /// page reads storage on its next load.
    ///
    /// # Errors
    ///
    /// [`Error::Protocol`] if the click on the toggle carried no checked
    /// state; storage errors are propagated.
    pub async fn handle_menu_click(
        &self,
        info: &ClickInfo,
        tab: Option<&TabInfo>,
    ) -> Result<ClickOutcome> {
        if info.menu_item_id != self.config.menu.id {
            return Ok(ClickOutcome::Ignored);
        }

        let enabled = info
            .checked
            .ok_or_else(|| Error::protocol("checkbox click without checked state"))?;

        save_preference(
            &self.host,
            self.area(),
            self.key(),
            SkipperPreference::new(enabled),
        )
        .await?;

        let notified = match tab {
            Some(tab) => self.notify_tab(tab, enabled).await,
            None => false,
        };

        info!(enabled, notified, "Manual skip button toggled");
        Ok(ClickOutcome::Toggled { enabled, notified })
    }

    async fn notify_tab(&self, tab: &TabInfo, enabled: bool) -> bool {
        let Some(tab_id) = tab.tab_id() else {
            return false;
        };

        if !tab.is_on_site(&self.config.site) {
            debug!(%tab_id, site = %self.config.site, "Tab not on site, skipping push");
            return false;
        }

        match self
            .host
            .send_message(tab_id, &ContentMessage::toggle(enabled))
            .await
        {
            Ok(ack) => ack.success,
            Err(e) => {
                debug!(%tab_id, error = %e, "Push not delivered");
                false
            }
        }
    }

    /// Handles `storage.onChanged`: mirrors the stored value into the menu.
    ///
    /// Covers every writer, including this coordinator's own click handling
    /// and edits made outside the menu.
    pub async fn handle_storage_changed(
        &self,
        changes: &StorageChanges,
        area: StorageArea,
    ) -> Result<()> {
        if area != self.area() {
            return Ok(());
        }

        let Some(preference) = SkipperPreference::from_changes(changes, self.key()) else {
            return Ok(());
        };

        debug!(enabled = preference.is_enabled(), "Syncing menu with storage");
        self.host
            .update(
                &self.config.menu.id,
                MenuItemUpdate::checked(preference.is_enabled()),
            )
            .await
    }
}

// ============================================================================
// PreferenceCoordinator - Event Loop
// ============================================================================

impl<H> PreferenceCoordinator<H>
where
    H: BackgroundHost,
{
    /// Dispatches one event.
    pub async fn handle_event(&self, event: BackgroundEvent) -> Result<()> {
        match event {
            BackgroundEvent::Installed(details) => self.handle_installed(&details).await,
            BackgroundEvent::Startup => self.handle_startup().await,
            BackgroundEvent::MenuClicked { info, tab } => self
                .handle_menu_click(&info, tab.as_ref())
                .await
                .map(|_| ()),
            BackgroundEvent::StorageChanged { changes, area } => {
                self.handle_storage_changed(&changes, area).await
            }
        }
    }

    /// Processes events until every sender is dropped.
    ///
    /// Handler errors are logged and the loop continues.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<BackgroundEvent>) {
        info!(site = %self.config.site, "Preference coordinator running");

        while let Some(event) = events.recv().await {
            let name = event.name();
            if let Err(e) = self.handle_event(event).await {
                warn!(event = name, error = %e, "Background handler failed");
            }
        }

        debug!("Preference coordinator stopped");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, PreferenceStore};
    use crate::identifiers::{MenuItemId, TabId};
    use crate::preference::PREFERENCE_KEY;
    use crate::protocol::StorageItems;
    use serde_json::json;

    fn coordinator() -> PreferenceCoordinator<MemoryHost> {
        PreferenceCoordinator::new(MemoryHost::new(), SkipperConfig::default())
    }

    fn toggle_id() -> MenuItemId {
        MenuItemId::new("toggleManualSkipButton")
    }

    fn checked(host: &MemoryHost) -> Option<bool> {
        host.menu_item(&toggle_id()).map(|item| item.checked)
    }

    async fn store(host: &MemoryHost, value: serde_json::Value) {
        let mut items = StorageItems::new();
        items.insert(PREFERENCE_KEY.to_string(), value);
        host.set(StorageArea::Sync, items).await.expect("set");
    }

    #[tokio::test]
    async fn test_fresh_install_stores_true_and_checks_menu() {
        let coordinator = coordinator();

        coordinator
            .handle_installed(&InstalledDetails::install())
            .await
            .expect("install");

        let host = coordinator.host();
        assert_eq!(host.stored(StorageArea::Sync, PREFERENCE_KEY), Some(json!(true)));
        assert_eq!(checked(host), Some(true));
        assert_eq!(host.menu_items().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_user_choice() {
        let coordinator = coordinator();
        store(coordinator.host(), json!(false)).await;

        coordinator
            .handle_installed(&InstalledDetails::update("0.9.0"))
            .await
            .expect("update");

        let host = coordinator.host();
        assert_eq!(host.stored(StorageArea::Sync, PREFERENCE_KEY), Some(json!(false)));
        assert_eq!(checked(host), Some(false));
    }

    #[tokio::test]
    async fn test_startup_defaults_to_checked() {
        let coordinator = coordinator();

        coordinator.handle_startup().await.expect("startup");

        assert_eq!(checked(coordinator.host()), Some(true));
    }

    #[tokio::test]
    async fn test_startup_reads_explicit_false() {
        let coordinator = coordinator();
        store(coordinator.host(), json!(false)).await;

        coordinator.handle_startup().await.expect("startup");

        assert_eq!(checked(coordinator.host()), Some(false));
    }

    #[tokio::test]
    async fn test_rebuild_twice_keeps_one_item() {
        let coordinator = coordinator();

        coordinator.rebuild_menu(true).await.expect("first");
        coordinator.rebuild_menu(false).await.expect("second");

        let items = coordinator.host().menu_items();
        assert_eq!(items.len(), 1);
        assert!(!items[0].checked);
    }

    #[tokio::test]
    async fn test_uncheck_on_site_tab_pushes_to_page() {
        let coordinator = coordinator();
        let tab_id = TabId::new(12).expect("valid tab id");
        let mut inbox = coordinator.host().connect_tab(tab_id);
        let tab = TabInfo::new(12, "https://www.youtube.com/watch?v=xyz");

        let outcome = coordinator
            .handle_menu_click(&ClickInfo::checkbox(toggle_id(), false), Some(&tab))
            .await
            .expect("click");

        assert_eq!(
            outcome,
            ClickOutcome::Toggled {
                enabled: false,
                notified: true
            }
        );
        assert_eq!(
            coordinator.host().stored(StorageArea::Sync, PREFERENCE_KEY),
            Some(json!(false))
        );
        assert_eq!(inbox.try_recv().ok(), Some(ContentMessage::toggle(false)));
    }

    #[tokio::test]
    async fn test_click_on_other_site_persists_without_push() {
        let coordinator = coordinator();
        let tab_id = TabId::new(4).expect("valid tab id");
        let mut inbox = coordinator.host().connect_tab(tab_id);
        let tab = TabInfo::new(4, "https://example.com/");

        let outcome = coordinator
            .handle_menu_click(&ClickInfo::checkbox(toggle_id(), false), Some(&tab))
            .await
            .expect("click");

        assert_eq!(
            outcome,
            ClickOutcome::Toggled {
                enabled: false,
                notified: false
            }
        );
        assert!(inbox.try_recv().is_err());
        assert_eq!(
            coordinator.host().stored(StorageArea::Sync, PREFERENCE_KEY),
            Some(json!(false))
        );
    }

    #[tokio::test]
    async fn test_click_without_listener_is_not_fatal() {
        let coordinator = coordinator();
        let tab = TabInfo::new(9, "https://www.youtube.com/");

        let outcome = coordinator
            .handle_menu_click(&ClickInfo::checkbox(toggle_id(), true), Some(&tab))
            .await
            .expect("click");

        assert_eq!(
            outcome,
            ClickOutcome::Toggled {
                enabled: true,
                notified: false
            }
        );
        assert_eq!(
            coordinator.host().stored(StorageArea::Sync, PREFERENCE_KEY),
            Some(json!(true))
        );
    }

    #[tokio::test]
    async fn test_click_on_other_item_ignored() {
        let coordinator = coordinator();

        let outcome = coordinator
            .handle_menu_click(&ClickInfo::checkbox(MenuItemId::new("other"), false), None)
            .await
            .expect("click");

        assert_eq!(outcome, ClickOutcome::Ignored);
        assert_eq!(coordinator.host().stored(StorageArea::Sync, PREFERENCE_KEY), None);
    }

    #[tokio::test]
    async fn test_click_without_checked_state_rejected() {
        let coordinator = coordinator();
        let info = ClickInfo {
            menu_item_id: toggle_id(),
            checked: None,
            was_checked: None,
        };

        let err = coordinator.handle_menu_click(&info, None).await.unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_external_change_unchecks_menu() {
        let coordinator = coordinator();
        coordinator.rebuild_menu(true).await.expect("rebuild");
        let mut changes_rx = coordinator.host().subscribe_storage();

        // Another actor writes the preference directly.
        let external = coordinator.host().clone();
        store(&external, json!(false)).await;

        let (area, changes) = changes_rx.try_recv().expect("change");
        coordinator
            .handle_storage_changed(&changes, area)
            .await
            .expect("sync");

        assert_eq!(checked(coordinator.host()), Some(false));
    }

    #[tokio::test]
    async fn test_change_in_other_area_ignored() {
        let coordinator = coordinator();
        coordinator.rebuild_menu(true).await.expect("rebuild");
        let mut changes_rx = coordinator.host().subscribe_storage();

        let mut items = StorageItems::new();
        items.insert(PREFERENCE_KEY.to_string(), json!(false));
        coordinator
            .host()
            .set(StorageArea::Local, items)
            .await
            .expect("set");

        let (area, changes) = changes_rx.try_recv().expect("change");
        coordinator
            .handle_storage_changed(&changes, area)
            .await
            .expect("sync");

        assert_eq!(checked(coordinator.host()), Some(true));
    }

    #[tokio::test]
    async fn test_run_survives_handler_errors() {
        let coordinator = coordinator();
        let (tx, rx) = mpsc::unbounded_channel();

        // Update before any menu exists fails; the loop must keep going.
        let mut changes = StorageChanges::default();
        changes.insert(
            PREFERENCE_KEY.to_string(),
            crate::protocol::StorageChange::new(None, Some(json!(false))),
        );
        tx.send(BackgroundEvent::StorageChanged {
            changes,
            area: StorageArea::Sync,
        })
        .expect("send");
        tx.send(BackgroundEvent::Installed(InstalledDetails::install()))
            .expect("send");
        drop(tx);

        coordinator.run(rx).await;

        assert_eq!(checked(coordinator.host()), Some(true));
    }
}
