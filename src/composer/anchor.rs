//! Caret anchoring for the floating suggestion panel.
//!
//! Two estimators share one placement step. The heuristic counts lines and
//! characters; the mirror variant asks a [`MirrorHost`] for the exact marker
//! box and falls back to the heuristic when no layout is available.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::mirror::{MarkerRect, MeasureError, MirrorGuard, MirrorHost, MirrorStyle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Geometry and font metrics of the host text field, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLayout {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub line_height: f32,
    #[serde(default)]
    pub padding: Padding,
    #[serde(default)]
    pub scroll_top: f32,
    pub viewport_height: f32,
}

impl FieldLayout {
    fn content_width(&self) -> f32 {
        (self.width - self.padding.left - self.padding.right).max(0.0)
    }

    fn content_top(&self) -> f32 {
        self.top + self.padding.top - self.scroll_top
    }

    fn content_left(&self) -> f32 {
        self.left + self.padding.left
    }
}

/// Panel dimensions and glyph estimate used for placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorMetrics {
    /// Estimated character advance as a fraction of the font size.
    pub char_width_ratio: f32,
    pub panel_width: f32,
    pub panel_height: f32,
}

impl Default for AnchorMetrics {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.6,
            panel_width: 240.0,
            panel_height: 200.0,
        }
    }
}

/// Where to put the suggestion panel.
///
/// When `bottom` is set the panel opens upward and its bottom edge sits
/// `bottom` pixels above the viewport's bottom, level with the caret's top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorPosition {
    pub top: f32,
    pub left: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f32>,
}

/// Caret line box relative to the field's content origin.
#[derive(Debug, Clone, Copy)]
struct CaretBox {
    top: f32,
    left: f32,
}

fn place(layout: &FieldLayout, metrics: &AnchorMetrics, caret: CaretBox) -> AnchorPosition {
    let max_left = (layout.content_width() - metrics.panel_width).max(0.0);
    let left = layout.content_left() + caret.left.clamp(0.0, max_left);

    let caret_top = layout.content_top() + caret.top;
    let top = caret_top + layout.line_height;

    let bottom = (top + metrics.panel_height > layout.viewport_height)
        .then(|| layout.viewport_height - caret_top);

    AnchorPosition { top, left, bottom }
}

/// Coarse estimate from line and character counts.
pub fn estimate_anchor(layout: &FieldLayout, text_before_caret: &str, metrics: &AnchorMetrics) -> AnchorPosition {
    let mut lines = text_before_caret.split('\n');
    let last_line = lines.next_back().unwrap_or("");
    let line_index = text_before_caret.matches('\n').count();

    let char_width = layout.font_size * metrics.char_width_ratio;
    let caret = CaretBox {
        top: line_index as f32 * layout.line_height,
        left: last_line.chars().count() as f32 * char_width,
    };
    place(layout, metrics, caret)
}

/// Exact placement through a mirror, falling back to [`estimate_anchor`].
pub fn measure_anchor<H: MirrorHost + ?Sized>(
    host: &H,
    layout: &FieldLayout,
    text_before_caret: &str,
    metrics: &AnchorMetrics,
) -> AnchorPosition {
    match measure_marker(host, layout, text_before_caret, metrics) {
        Ok(rect) => place(
            layout,
            metrics,
            CaretBox {
                top: rect.top,
                left: rect.left,
            },
        ),
        Err(e) => {
            tracing::debug!(error = %e, "mirror measurement failed, using heuristic anchor");
            estimate_anchor(layout, text_before_caret, metrics)
        }
    }
}

/// Picks between mirror measurement and the heuristic.
#[derive(Clone, Default)]
pub struct AnchorEstimator {
    metrics: AnchorMetrics,
    mirror: Option<Arc<dyn MirrorHost + Send + Sync>>,
}

impl fmt::Debug for AnchorEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorEstimator")
            .field("metrics", &self.metrics)
            .field("mirror", &self.mirror.is_some())
            .finish()
    }
}

impl AnchorEstimator {
    pub fn heuristic(metrics: AnchorMetrics) -> Self {
        Self {
            metrics,
            mirror: None,
        }
    }

    pub fn with_mirror(metrics: AnchorMetrics, host: Arc<dyn MirrorHost + Send + Sync>) -> Self {
        Self {
            metrics,
            mirror: Some(host),
        }
    }

    pub fn anchor(&self, layout: &FieldLayout, text_before_caret: &str) -> AnchorPosition {
        match &self.mirror {
            Some(host) => measure_anchor(host.as_ref(), layout, text_before_caret, &self.metrics),
            None => estimate_anchor(layout, text_before_caret, &self.metrics),
        }
    }
}

fn measure_marker<H: MirrorHost + ?Sized>(
    host: &H,
    layout: &FieldLayout,
    text_before_caret: &str,
    metrics: &AnchorMetrics,
) -> Result<MarkerRect, MeasureError> {
    let style = MirrorStyle {
        font_size: layout.font_size,
        line_height: layout.line_height,
        char_width: layout.font_size * metrics.char_width_ratio,
        content_width: layout.content_width(),
    };
    let mirror = MirrorGuard::mount(host, &style)?;
    mirror.measure(text_before_caret)
}
