//! Slidecast Capture Engine
//!
//! Drives a headless rendering engine through one capture session per
//! slide: record, wait for the timeline, finalize, resolve the artifact.
//! Engine resources are released on every path, including failure and
//! cancellation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 SlidePipeline                    │
//! │  RenderRequest ─► Composer ─► ComposedDocument   │
//! │                                   │              │
//! │  ┌────────────────────────────────▼────────────┐ │
//! │  │            CaptureOrchestrator              │ │
//! │  │  ┌────────────┐ ┌───────────┐ ┌──────────┐  │ │
//! │  │  │RenderEngine│ │ Scheduler │ │ Artifact │  │ │
//! │  │  │            │ │ + cancel  │ │ Locator  │  │ │
//! │  │  └─────┬──────┘ └───────────┘ └────┬─────┘  │ │
//! │  │        ▼                           ▼        │ │
//! │  │   <work_dir>/<session_id>/  ─►  artifact    │ │
//! │  └─────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod engine;
pub mod locator;
pub mod orchestrator;
pub mod pipeline;
pub mod scheduler;
pub mod session;
pub mod workspace;

pub use engine::{
    FrameSize, ProcessEngine, RecordingContext, RenderEngine, SurfaceConfig, SurfaceHandle,
};
pub use locator::{ArtifactLocator, DirectoryScanLocator};
pub use orchestrator::{ArtifactHandle, CaptureOptions, CaptureOrchestrator, CaptureSettings};
pub use pipeline::{BatchEntry, BatchOutcome, RenderOutcome, SlidePipeline};
pub use scheduler::{Scheduler, TokioScheduler, WaitOutcome};
pub use session::{CaptureSession, CaptureState};
pub use tokio_util::sync::CancellationToken;
pub use workspace::{generate_session_id, SessionWorkspace};
