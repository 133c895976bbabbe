//! Slide → document composition.

use slidecast_common::config::ComposerConfig;
use slidecast_common::error::SlidecastResult;
use slidecast_slide_model::{validate_duration, SlideSpec};

use crate::cue::Timeline;
use crate::document::{BarLayout, ComposedDocument};
use crate::html;

/// Default canvas, in logical pixels.
pub const DEFAULT_CANVAS: (u32, u32) = (1920, 1080);

/// Composes slides with a fixed set of timing constants.
#[derive(Debug, Clone)]
pub struct Composer {
    config: ComposerConfig,
    canvas: (u32, u32),
}

impl Composer {
    /// Create a composer with the given configuration.
    pub fn new(config: ComposerConfig) -> Self {
        Self {
            config,
            canvas: DEFAULT_CANVAS,
        }
    }

    /// Create a composer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ComposerConfig::default())
    }

    /// Use a different canvas size.
    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas = (width, height);
        self
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose `slide` into a document that plays out over `duration_secs`.
    ///
    /// Fails with `InvalidSlideData` for a non-positive duration, for chart
    /// values that are not finite or are negative, and for cues scheduled
    /// past the duration under the reject policy.
    pub fn compose(&self, slide: &SlideSpec, duration_secs: f64) -> SlidecastResult<ComposedDocument> {
        validate_duration(duration_secs)?;
        slide.validate()?;

        let timeline = Timeline::schedule(slide, duration_secs, &self.config)?;
        let bars = if slide.has_chart() {
            layout_bars(slide)
        } else {
            Vec::new()
        };

        let html = html::render_page(&slide.text, &slide.bullets, &bars, &timeline, self.canvas);

        tracing::debug!(
            cues = timeline.cues.len(),
            bars = bars.len(),
            duration_secs,
            bytes = html.len(),
            "Composed slide document"
        );

        Ok(ComposedDocument {
            html,
            timeline,
            bars,
        })
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Compose with default timing and canvas.
pub fn compose(slide: &SlideSpec, duration_secs: f64) -> SlidecastResult<ComposedDocument> {
    Composer::with_defaults().compose(slide, duration_secs)
}

/// Normalize bar heights against the largest value. An all-zero chart
/// draws every bar at zero height.
fn layout_bars(slide: &SlideSpec) -> Vec<BarLayout> {
    let max = slide.visual_data.max_value().unwrap_or(0.0);
    slide
        .visual_data
        .iter()
        .map(|datum| BarLayout {
            label: datum.label.clone(),
            value: datum.value,
            height_pct: if max > 0.0 {
                datum.value / max * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
