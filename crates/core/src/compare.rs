//! Before/after image comparison state.
//!
//! The widget shows an original and an enhanced image stacked on top of each
//! other with a draggable reveal boundary. All state lives in this struct so
//! the storefront can carry it in a query string between renders.

use serde::{Deserialize, Serialize};

/// Reveal boundary position after a reset, in percent.
pub const DEFAULT_POSITION: f64 = 50.0;
/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 3.0;
/// Zoom change per button press.
pub const ZOOM_STEP: f64 = 0.25;

/// Buttons of the comparison widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompareAction {
    ToggleOriginal,
    ToggleEnhanced,
    ZoomIn,
    ZoomOut,
    Reset,
    Approve,
    Reject,
}

/// Moderation verdict emitted by the approve and reject buttons.
///
/// The widget only reports the press; whoever embeds it decides what the
/// verdict changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

/// Current state of one comparison widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageCompare {
    /// Reveal boundary in percent of the container width, `0..=100`.
    pub position: f64,
    /// Zoom factor, `MIN_ZOOM..=MAX_ZOOM`.
    pub zoom: f64,
    pub show_original: bool,
    pub show_enhanced: bool,
}

impl Default for ImageCompare {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            zoom: 1.0,
            show_original: true,
            show_enhanced: true,
        }
    }
}

impl ImageCompare {
    /// Bring values that arrived from outside back into range.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            position: clamp_or(self.position, 0.0, 100.0, DEFAULT_POSITION),
            zoom: clamp_or(snap_zoom(self.zoom), MIN_ZOOM, MAX_ZOOM, 1.0),
            ..self
        }
    }

    /// Move the boundary to pointer offset `x` inside a container `width` wide.
    ///
    /// Offsets outside the container clamp to the edges. A zero or negative
    /// width leaves the boundary where it is.
    pub fn drag_to(&mut self, x: f64, width: f64) {
        if width.is_nan() || width <= 0.0 || !x.is_finite() {
            return;
        }
        self.position = (x / width * 100.0).clamp(0.0, 100.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn toggle_original(&mut self) {
        self.show_original = !self.show_original;
    }

    pub fn toggle_enhanced(&mut self) {
        self.show_enhanced = !self.show_enhanced;
    }

    /// Restore boundary, zoom and visibility to their initial values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a button press.
    ///
    /// Approve and reject leave the view untouched and return a verdict,
    /// but only when the widget was rendered with actions enabled.
    pub fn press(&mut self, action: CompareAction, actions_enabled: bool) -> Option<Verdict> {
        match action {
            CompareAction::ToggleOriginal => self.toggle_original(),
            CompareAction::ToggleEnhanced => self.toggle_enhanced(),
            CompareAction::ZoomIn => self.zoom_in(),
            CompareAction::ZoomOut => self.zoom_out(),
            CompareAction::Reset => self.reset(),
            CompareAction::Approve => return actions_enabled.then_some(Verdict::Approve),
            CompareAction::Reject => return actions_enabled.then_some(Verdict::Reject),
        }
        None
    }

    /// Zoom as a whole percentage for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn zoom_percent(&self) -> i64 {
        (self.zoom * 100.0).round() as i64
    }
}

/// Round a zoom factor to the nearest `ZOOM_STEP`.
fn snap_zoom(zoom: f64) -> f64 {
    (zoom / ZOOM_STEP).round() * ZOOM_STEP
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
