//! Error types shared across Slidecast crates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level error type for Slidecast operations.
///
/// The first six variants form the pipeline's error taxonomy; their
/// [`ErrorKind`] is preserved all the way to the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum SlidecastError {
    #[error("Invalid slide data: {message}")]
    InvalidSlideData { message: String },

    #[error("Rendering engine unavailable: {message}")]
    EngineUnavailable { message: String },

    #[error("Document did not reach resource-idle within {timeout_secs}s")]
    LoadTimeout { timeout_secs: f64 },

    #[error("No capture artifact found in {dir}")]
    ArtifactNotFound { dir: PathBuf },

    #[error("Capture cancelled")]
    Cancelled,

    #[error("I/O failure at {path}: {source}")]
    IoFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using SlidecastError.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

/// Stable, serializable discriminant of a [`SlidecastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidSlideData,
    EngineUnavailable,
    LoadTimeout,
    ArtifactNotFound,
    Cancelled,
    #[serde(rename = "IOFailure")]
    IoFailure,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSlideData => "InvalidSlideData",
            Self::EngineUnavailable => "EngineUnavailable",
            Self::LoadTimeout => "LoadTimeout",
            Self::ArtifactNotFound => "ArtifactNotFound",
            Self::Cancelled => "Cancelled",
            Self::IoFailure => "IOFailure",
            Self::Config => "Config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SlidecastError {
    pub fn invalid_slide_data(msg: impl Into<String>) -> Self {
        Self::InvalidSlideData {
            message: msg.into(),
        }
    }

    pub fn engine_unavailable(msg: impl Into<String>) -> Self {
        Self::EngineUnavailable {
            message: msg.into(),
        }
    }

    pub fn load_timeout(timeout_secs: f64) -> Self {
        Self::LoadTimeout { timeout_secs }
    }

    pub fn artifact_not_found(dir: impl Into<PathBuf>) -> Self {
        Self::ArtifactNotFound { dir: dir.into() }
    }

    pub fn io_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoFailure {
            path: path.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// The taxonomy kind of this error.
    ///
    /// Untyped I/O errors count as `IOFailure`; JSON errors can only come
    /// from malformed input and count as `InvalidSlideData`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSlideData { .. } | Self::Json(_) => ErrorKind::InvalidSlideData,
            Self::EngineUnavailable { .. } => ErrorKind::EngineUnavailable,
            Self::LoadTimeout { .. } => ErrorKind::LoadTimeout,
            Self::ArtifactNotFound { .. } => ErrorKind::ArtifactNotFound,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::IoFailure { .. } | Self::Io(_) => ErrorKind::IoFailure,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Build the structured report handed to the transport layer.
    pub fn report(&self) -> ErrorReport {
        ErrorReport::from(self)
    }
}

/// Structured error returned to the caller: `{ errorKind, message }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_kind: ErrorKind,
    pub message: String,
}

impl From<&SlidecastError> for ErrorReport {
    fn from(err: &SlidecastError) -> Self {
        Self {
            error_kind: err.kind(),
            message: err.to_string(),
        }
    }
}
