//! Manual skip button concern.
//!
//! The button lives in the player's right-hand control bar, just before
//! the settings gear, and borrows the player's own `ytp-button` styling.
//! Its presence is guarded by element id, so repeated passes never
//! duplicate it.

// ============================================================================
// Imports
// ============================================================================

use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::{ButtonSpec, Selectors};
use crate::error::Result;

use super::dom::Dom;
use super::skip::force_skip_ad;

// ============================================================================
// Reconcile
// ============================================================================

/// Result of bringing the button in line with the preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// The button was added.
    Inserted,
    /// The button was removed.
    Removed,
    /// The page already matched the preference.
    Unchanged,
    /// The player controls are not rendered yet; a later pass will retry.
    Pending,
}

// ============================================================================
// Operations
// ============================================================================

/// Inserts or removes the button to match `enabled`.
///
/// # Errors
///
/// Propagates [`Error::Dom`](crate::Error::Dom) from the document.
pub fn reconcile_button<D: Dom>(
    dom: &D,
    selectors: &Selectors,
    button: &ButtonSpec,
    enabled: bool,
) -> Result<Reconcile> {
    if enabled {
        insert_manual_skip_button(dom, selectors, button)
    } else {
        Ok(remove_manual_skip_button(dom, button))
    }
}

/// Adds the button to the player controls unless it is already there.
///
/// The icon is a copy of the player's next-video graphic when available,
/// otherwise [`ButtonSpec::fallback_icon`]. Clicking it runs
/// [`force_skip_ad`].
///
/// # Errors
///
/// Propagates [`Error::Dom`](crate::Error::Dom) from the document.
pub fn insert_manual_skip_button<D: Dom>(
    dom: &D,
    selectors: &Selectors,
    spec: &ButtonSpec,
) -> Result<Reconcile> {
    let Some(controls) = dom.query_selector(&selectors.right_controls)? else {
        trace!("Player controls not rendered yet");
        return Ok(Reconcile::Pending);
    };

    if dom.element_by_id(&spec.id).is_some() {
        return Ok(Reconcile::Unchanged);
    }

    // Checked before building anything so a missing anchor leaves no
    // detached element behind.
    let Some(anchor) = dom.query_selector_in(&controls, &selectors.settings_button)? else {
        trace!("Settings button not rendered yet");
        return Ok(Reconcile::Pending);
    };

    let button = dom.create_element("button")?;
    dom.set_attribute(&button, "id", &spec.id)?;
    dom.set_attribute(&button, "class", &spec.class_name)?;
    dom.set_attribute(&button, "title", &spec.title)?;

    match dom.query_selector(&selectors.next_button_icon)? {
        Some(icon) => dom.append_clone(&button, &icon)?,
        None => dom.set_inner_html(&button, &spec.fallback_icon)?,
    }

    let handler_dom = dom.clone();
    let handler_selectors = selectors.clone();
    dom.set_click_handler(
        &button,
        Rc::new(move || match force_skip_ad(&handler_dom, &handler_selectors) {
            Ok(outcome) => debug!(ad_showing = outcome.ad_showing, "Manual skip clicked"),
            Err(e) => warn!(error = %e, "Manual skip failed"),
        }),
    )?;

    dom.insert_before(&controls, &button, &anchor)?;

    debug!(id = %spec.id, "Manual skip button inserted");
    Ok(Reconcile::Inserted)
}

/// Removes the button if present.
pub fn remove_manual_skip_button<D: Dom>(dom: &D, spec: &ButtonSpec) -> Reconcile {
    match dom.element_by_id(&spec.id) {
        Some(button) => {
            dom.remove(&button);
            debug!(id = %spec.id, "Manual skip button removed");
            Reconcile::Removed
        }
        None => Reconcile::Unchanged,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::dom::{NodeId, VirtualDocument};

    struct Player {
        doc: VirtualDocument,
        player: NodeId,
        controls: NodeId,
        settings: NodeId,
    }

    fn player() -> Player {
        let doc = VirtualDocument::new();
        let player = doc.append_element(doc.body(), "div", &["html5-video-player"]);
        let controls = doc.append_element(player, "div", &["ytp-right-controls"]);
        let _subtitles = doc.append_element(controls, "button", &["ytp-subtitles-button"]);
        let settings = doc.append_element(controls, "button", &["ytp-settings-button"]);
        let _fullscreen = doc.append_element(controls, "button", &["ytp-fullscreen-button"]);
        Player {
            doc,
            player,
            controls,
            settings,
        }
    }

    fn insert(doc: &VirtualDocument) -> Reconcile {
        insert_manual_skip_button(doc, &Selectors::default(), &ButtonSpec::default())
            .expect("insert")
    }

    #[test]
    fn test_inserted_before_settings() {
        let p = player();

        assert_eq!(insert(&p.doc), Reconcile::Inserted);

        let button = p
            .doc
            .element_by_id("skipper-manual-force-skip-button")
            .expect("button");
        let children = p.doc.children(p.controls);
        let index = children.iter().position(|&c| c == button).expect("in controls");
        assert_eq!(children[index + 1], p.settings);
        assert_eq!(p.doc.attribute(button, "class").as_deref(), Some("ytp-button"));
        assert_eq!(p.doc.attribute(button, "title").as_deref(), Some("Force Skip Ad"));
    }

    #[test]
    fn test_second_insert_is_noop() {
        let p = player();

        insert(&p.doc);
        let writes = p.doc.write_count();
        assert_eq!(insert(&p.doc), Reconcile::Unchanged);

        assert_eq!(p.doc.count("#skipper-manual-force-skip-button").expect("count"), 1);
        assert_eq!(p.doc.write_count(), writes);
    }

    #[test]
    fn test_pending_without_controls() {
        let doc = VirtualDocument::new();
        assert_eq!(insert(&doc), Reconcile::Pending);
        assert_eq!(doc.write_count(), 0);
    }

    #[test]
    fn test_pending_without_settings_anchor() {
        let p = player();
        p.doc.detach(p.settings);

        assert_eq!(insert(&p.doc), Reconcile::Pending);
        assert_eq!(p.doc.element_by_id("skipper-manual-force-skip-button"), None);
        assert_eq!(p.doc.write_count(), 0);
    }

    #[test]
    fn test_clones_next_button_icon() {
        let p = player();
        let left = p.doc.append_element(p.player, "div", &["ytp-left-controls"]);
        let next = p.doc.append_element(left, "a", &["ytp-next-button", "ytp-button"]);
        let svg = p.doc.append_element(next, "svg", &[]);

        insert(&p.doc);

        let button = p
            .doc
            .element_by_id("skipper-manual-force-skip-button")
            .expect("button");
        let icon = p.doc.children(button);
        assert_eq!(icon.len(), 1);
        assert_ne!(icon[0], svg);
        assert_eq!(p.doc.tag(icon[0]), "svg");
        assert_eq!(p.doc.inner_html(button), None);
    }

    #[test]
    fn test_fallback_icon() {
        let p = player();

        insert(&p.doc);

        let button = p
            .doc
            .element_by_id("skipper-manual-force-skip-button")
            .expect("button");
        assert_eq!(p.doc.inner_html(button).as_deref(), Some(crate::config::FALLBACK_ICON_SVG));
    }

    #[test]
    fn test_click_forces_skip() {
        let p = player();
        p.doc.toggle_class(p.player, "ad-showing", true);
        let video = p.doc.append_element(p.player, "video", &[]);
        p.doc.set_media(video, 20.0);

        insert(&p.doc);
        let button = p
            .doc
            .element_by_id("skipper-manual-force-skip-button")
            .expect("button");
        p.doc.click(&button);

        assert_eq!(p.doc.media_position(video), Some(20.0));
    }

    #[test]
    fn test_remove() {
        let p = player();
        insert(&p.doc);

        assert_eq!(
            remove_manual_skip_button(&p.doc, &ButtonSpec::default()),
            Reconcile::Removed
        );
        assert_eq!(
            remove_manual_skip_button(&p.doc, &ButtonSpec::default()),
            Reconcile::Unchanged
        );
        assert_eq!(p.doc.count("#skipper-manual-force-skip-button").expect("count"), 0);
    }
}
