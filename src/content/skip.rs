//! Ad-skip concern.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, trace};

use crate::config::Selectors;
use crate::error::Result;

use super::dom::Dom;

// ============================================================================
// SkipOutcome
// ============================================================================

/// What one force-skip pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkipOutcome {
    /// The ad marker was present.
    pub ad_showing: bool,
    /// Position the ad video was moved to.
    pub skipped_to: Option<f64>,
    /// The native skip control was clicked.
    pub native_skip_clicked: bool,
}

impl SkipOutcome {
    /// Returns `true` if the pass touched the page.
    #[inline]
    #[must_use]
    pub fn acted(&self) -> bool {
        self.skipped_to.is_some() || self.native_skip_clicked
    }
}

// ============================================================================
// force_skip_ad
// ============================================================================

/// Ends the current ad, if any.
///
/// Moves the ad video to its end and clicks the native skip control when
/// the player offers one. Without the ad marker nothing is written. A
/// duration that is not yet known (`NaN`), infinite or zero is left alone.
///
/// Idempotent: a second pass writes the same position again.
///
/// # Errors
///
/// Returns [`Error::Dom`](crate::Error::Dom) for an unparsable selector or
/// a failed position write.
pub fn force_skip_ad<D: Dom>(dom: &D, selectors: &Selectors) -> Result<SkipOutcome> {
    let Some(container) = dom.query_selector(&selectors.ad_container)? else {
        trace!("No ad showing");
        return Ok(SkipOutcome::default());
    };

    let mut outcome = SkipOutcome {
        ad_showing: true,
        ..SkipOutcome::default()
    };

    if let Some(video) = dom.query_selector_in(&container, &selectors.ad_video)?
        && let Some(duration) = dom.media_duration(&video)
        && duration.is_finite()
        && duration > 0.0
    {
        dom.set_media_position(&video, duration)?;
        outcome.skipped_to = Some(duration);
    }

    if let Some(skip) = dom.query_selector(&selectors.native_skip_button)? {
        dom.click(&skip);
        outcome.native_skip_clicked = true;
    }

    if outcome.acted() {
        debug!(
            skipped_to = ?outcome.skipped_to,
            native_skip_clicked = outcome.native_skip_clicked,
            "Ad skipped"
        );
    }

    Ok(outcome)
}

// ============================================================================
// Tests
// ============================================================================
