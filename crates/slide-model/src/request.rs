//! Render requests as they arrive from the transport layer.

use serde::{Deserialize, Serialize};

use slidecast_common::error::{SlidecastError, SlidecastResult};

use crate::slide::SlideSpec;

/// A request to render one slide into a video clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Slide content.
    pub slide_data: SlideSpec,

    /// Clip length in seconds.
    pub duration: f64,

    /// 1-based slide number, used to name the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_number: Option<u32>,

    /// Caller-chosen session identifier; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl RenderRequest {
    pub fn new(slide_data: SlideSpec, duration: f64) -> Self {
        Self {
            slide_data,
            duration,
            slide_number: None,
            session_id: None,
        }
    }

    /// Slide number, defaulting to 1.
    pub fn slide_number(&self) -> u32 {
        self.slide_number.unwrap_or(1)
    }

    /// Check everything that can be checked before any engine work.
    pub fn validate(&self) -> SlidecastResult<()> {
        validate_duration(self.duration)?;
        if let Some(id) = &self.session_id {
            validate_session_id(id)?;
        }
        self.slide_data.validate()
    }
}

/// Several slides rendered as one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub slides: Vec<RenderRequest>,
}

impl BatchRequest {
    /// Requests with their slide numbers filled in from their position
    /// (1-based) where the caller left them out.
    pub fn numbered(self) -> Vec<RenderRequest> {
        self.slides
            .into_iter()
            .enumerate()
            .map(|(index, mut request)| {
                request.slide_number.get_or_insert(index as u32 + 1);
                request
            })
            .collect()
    }
}

/// Durations must be positive and finite.
pub fn validate_duration(duration: f64) -> SlidecastResult<()> {
    if duration.is_finite() && duration > 0.0 {
        Ok(())
    } else {
        Err(SlidecastError::invalid_slide_data(format!(
            "duration must be a positive number of seconds, got {duration}"
        )))
    }
}

/// Session identifiers become directory names, so they are restricted to
/// `[A-Za-z0-9_-]`, 1 to 64 characters.
pub fn validate_session_id(id: &str) -> SlidecastResult<()> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SlidecastError::invalid_slide_data(format!(
            "session id {id:?} must be 1-64 characters of [A-Za-z0-9_-]"
        )))
    }
}
