//! Cue schedule: when each element of a slide starts animating.
//!
//! # Schedule
//!
//! ```text
//! 0.0s        0.3s     0.8s  1.2s  1.6s   1.5s  1.8s  2.1s
//!  |-----------title----bullet0-bullet1-...  bar0--bar1--bar2 ...
//! ```
//!
//! Bullets and bars run on independent staggers; each stagger is strictly
//! increasing by a fixed gap.

use serde::Serialize;

use slidecast_common::config::{ComposerConfig, OverrunPolicy};
use slidecast_common::error::{SlidecastError, SlidecastResult};
use slidecast_slide_model::SlideSpec;

/// The element a cue animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "lowercase")]
pub enum CueTarget {
    Title,
    /// Bullet by 0-based position.
    Bullet(usize),
    /// Chart bar by 0-based position in `visual_data`.
    Bar(usize),
}

impl CueTarget {
    /// Stable identifier used in the document's `data-cue` attributes.
    pub fn element_id(&self) -> String {
        match self {
            Self::Title => "title".to_string(),
            Self::Bullet(i) => format!("bullet-{i}"),
            Self::Bar(i) => format!("bar-{i}"),
        }
    }
}

/// Which keyframe animation a cue triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    /// Fade in while sliding up.
    FadeIn,
    /// Fade the bar in and grow its fill from the baseline.
    BarReveal,
}

impl AnimationKind {
    /// CSS keyframes name.
    pub fn keyframes(&self) -> &'static str {
        match self {
            Self::FadeIn => "fadeIn",
            Self::BarReveal => "growUp",
        }
    }
}

/// A single timestamped animation trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cue {
    pub target: CueTarget,
    pub delay_secs: f64,
    pub animation: AnimationKind,
}

/// The ordered set of cues for one slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// Slide duration the schedule was checked against.
    pub duration_secs: f64,

    /// Title first, then bullets in order, then bars in order.
    pub cues: Vec<Cue>,
}

impl Timeline {
    /// Derive the schedule for a slide.
    ///
    /// Cue delays past `duration_secs` are handled per
    /// [`ComposerConfig::overrun`]: rejected as `InvalidSlideData`, or
    /// clamped to the duration.
    pub fn schedule(
        slide: &SlideSpec,
        duration_secs: f64,
        config: &ComposerConfig,
    ) -> SlidecastResult<Self> {
        let mut cues = Vec::with_capacity(1 + slide.bullets.len() + slide.visual_data.len());

        cues.push(Cue {
            target: CueTarget::Title,
            delay_secs: config.title_delay,
            animation: AnimationKind::FadeIn,
        });

        cues.extend((0..slide.bullets.len()).map(|i| Cue {
            target: CueTarget::Bullet(i),
            delay_secs: stagger(config.base_bullet_delay, config.bullet_gap, i),
            animation: AnimationKind::FadeIn,
        }));

        if slide.has_chart() {
            cues.extend((0..slide.visual_data.len()).map(|i| Cue {
                target: CueTarget::Bar(i),
                delay_secs: stagger(config.chart_delay, config.bar_gap, i),
                animation: AnimationKind::BarReveal,
            }));
        }

        for cue in &mut cues {
            if cue.delay_secs <= duration_secs {
                continue;
            }
            match config.overrun {
                OverrunPolicy::Reject => {
                    return Err(SlidecastError::invalid_slide_data(format!(
                        "{} is cued at {}s, past the {}s slide duration",
                        cue.target.element_id(),
                        cue.delay_secs,
                        duration_secs
                    )));
                }
                OverrunPolicy::Clamp => {
                    tracing::debug!(
                        target_element = %cue.target.element_id(),
                        delay_secs = cue.delay_secs,
                        duration_secs,
                        "Clamping cue to slide duration"
                    );
                    cue.delay_secs = duration_secs;
                }
            }
        }

        Ok(Self {
            duration_secs,
            cues,
        })
    }

    /// Delay of the cue for `target`, if present.
    pub fn delay_of(&self, target: CueTarget) -> Option<f64> {
        self.cues
            .iter()
            .find(|c| c.target == target)
            .map(|c| c.delay_secs)
    }

    pub fn bullet_cues(&self) -> impl Iterator<Item = &Cue> {
        self.cues
            .iter()
            .filter(|c| matches!(c.target, CueTarget::Bullet(_)))
    }

    pub fn bar_cues(&self) -> impl Iterator<Item = &Cue> {
        self.cues
            .iter()
            .filter(|c| matches!(c.target, CueTarget::Bar(_)))
    }

    /// Delay of the latest cue.
    pub fn last_delay_secs(&self) -> f64 {
        self.cues.iter().map(|c| c.delay_secs).fold(0.0, f64::max)
    }
}

/// `base + index * gap`, snapped to the millisecond resolution the document
/// is written with, so `0.8 + 0.4` is `1.2` and not `1.2000000000000002`.
fn stagger(base: f64, gap: f64, index: usize) -> f64 {
    ((base + index as f64 * gap) * 1000.0).round() / 1000.0
}
