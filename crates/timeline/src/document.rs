//! The composed, self-contained document handed to the capture stage.

use serde::Serialize;

use crate::cue::Timeline;

/// Normalized geometry of one chart bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarLayout {
    pub label: String,
    pub value: f64,

    /// `value / max * 100`, or 0 when every value is zero.
    pub height_pct: f64,
}

/// A renderable page plus the schedule embedded in it.
///
/// Consumed once by a capture session.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDocument {
    pub(crate) html: String,
    pub(crate) timeline: Timeline,
    pub(crate) bars: Vec<BarLayout>,
}

impl ComposedDocument {
    /// The page markup.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The cue schedule the markup plays out.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Chart bars, empty when no chart was composed.
    pub fn bars(&self) -> &[BarLayout] {
        &self.bars
    }

    pub fn has_chart(&self) -> bool {
        !self.bars.is_empty()
    }

    /// Slide duration the document was composed for.
    pub fn duration_secs(&self) -> f64 {
        self.timeline.duration_secs
    }

    pub fn into_html(self) -> String {
        self.html
    }
}
