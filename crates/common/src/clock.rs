//! Clock utilities for render timing.
//!
//! Every render is timed from the moment the request is accepted until the
//! artifact is resolved. The elapsed wall-clock time is part of the render
//! outcome handed back to the caller.

use std::time::{Duration, Instant};

/// A monotonic clock anchored at the start of one render.
#[derive(Debug, Clone)]
pub struct RenderClock {
    /// The instant the render started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl RenderClock {
    /// Create a new render clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Time elapsed since the render started.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Seconds elapsed since the render started.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Seconds elapsed, rounded to centiseconds for reporting.
    pub fn elapsed_secs_rounded(&self) -> f64 {
        round_centis(self.elapsed_secs())
    }

    /// Wall-clock time at render start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Convert fractional seconds into a `Duration`, saturating negative and
/// non-finite input to zero.
pub fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}

fn round_centis(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
