//! The capture orchestrator: one composed document in, one artifact out.
//!
//! # Lifecycle
//!
//! 1. Launch a surface and start recording into the session directory,
//!    then load the document and wait for resource-idle (bounded).
//! 2. Recording has been running since step 1; a short blank lead-in is
//!    accepted in exchange for never missing the first visible frame.
//! 3. Wait out the timeline plus a safety margin, or until cancelled.
//! 4. Close the view, then the recording (which flushes the artifact),
//!    locate the artifact and move it to its destination.
//! 5. Release the surface, whatever happened before.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use slidecast_common::clock::secs_to_duration;
use slidecast_common::config::{CaptureConfig, EngineConfig};
use slidecast_common::error::{SlidecastError, SlidecastResult};
use slidecast_slide_model::validate_duration;
use slidecast_timeline::ComposedDocument;

use crate::engine::{FrameSize, RecordingContext, RenderEngine, SurfaceConfig, SurfaceHandle};
use crate::locator::{ArtifactLocator, DirectoryScanLocator};
use crate::scheduler::{Scheduler, TokioScheduler, WaitOutcome};
use crate::session::{CaptureSession, CaptureState};
use crate::workspace::SessionWorkspace;

/// The resolved capture. The caller owns the file from here on and is
/// responsible for deleting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactHandle {
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
    pub session_id: String,
}

/// Orchestrator settings, resolved from configuration.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Root under which session directories are created.
    pub work_dir: PathBuf,
    pub surface: SurfaceConfig,
    pub safety_margin: Duration,
    pub load_timeout: Duration,
    pub finalize_timeout: Duration,
    pub capture_extension: String,
}

impl CaptureSettings {
    pub fn from_config(capture: &CaptureConfig, engine: &EngineConfig) -> Self {
        Self {
            work_dir: capture.work_dir.clone(),
            surface: SurfaceConfig {
                headless: engine.headless,
                sandbox_disabled: engine.sandbox_disabled,
                canvas: FrameSize::new(capture.canvas_width, capture.canvas_height),
            },
            safety_margin: secs_to_duration(capture.safety_margin_secs),
            load_timeout: secs_to_duration(capture.load_timeout_secs),
            finalize_timeout: secs_to_duration(capture.finalize_timeout_secs),
            capture_extension: capture.capture_extension.clone(),
        }
    }

    /// Default settings rooted at `work_dir`.
    pub fn with_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        let capture = CaptureConfig {
            work_dir: work_dir.into(),
            ..CaptureConfig::default()
        };
        Self::from_config(&capture, &EngineConfig::default())
    }
}

/// Per-call capture options.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Session identifier; generated when absent.
    pub session_id: Option<String>,

    /// Used to name the default destination.
    pub slide_number: u32,

    /// Where the artifact should end up; defaults to
    /// `<work_dir>/slide_<n>_<session_id>.<ext>`. An existing file is never
    /// overwritten: the capture fails with `IoFailure` and the artifact is
    /// left in the session directory.
    pub destination: Option<PathBuf>,

    /// Triggers an early, clean abort.
    pub cancel: CancellationToken,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            session_id: None,
            slide_number: 1,
            destination: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// Engine resources owned by exactly one session.
///
/// If a capture future is dropped mid-flight the surface is released from
/// a detached task.
struct EngineResources {
    engine: Arc<dyn RenderEngine>,
    surface: Option<SurfaceHandle>,
    recording: Option<RecordingContext>,
    view_open: bool,
}

impl EngineResources {
    fn new(engine: Arc<dyn RenderEngine>) -> Self {
        Self {
            engine,
            surface: None,
            recording: None,
            view_open: false,
        }
    }
}

impl Drop for EngineResources {
    fn drop(&mut self) {
        let Some(surface) = self.surface.take() else {
            return;
        };
        let recording = self.recording.take();
        let engine = self.engine.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(surface = surface.id(), "Capture abandoned; releasing surface");
                handle.spawn(async move {
                    if let Some(recording) = recording {
                        let _ = engine.close_recording(recording).await;
                    }
                    if let Err(e) = engine.release_surface(surface).await {
                        tracing::warn!(error = %e, "Failed to release abandoned surface");
                    }
                });
            }
            Err(_) => {
                tracing::error!(surface = surface.id(), "Surface leaked: no runtime to release it");
            }
        }
    }
}

/// Drives a [`RenderEngine`] through one capture session per call.
///
/// The orchestrator itself is stateless between calls and can run any
/// number of sessions concurrently; each gets its own surface and output
/// directory.
pub struct CaptureOrchestrator {
    engine: Arc<dyn RenderEngine>,
    scheduler: Arc<dyn Scheduler>,
    locator: Arc<dyn ArtifactLocator>,
    settings: CaptureSettings,
}

impl CaptureOrchestrator {
    /// Create an orchestrator using the tokio timer and directory-scan
    /// artifact resolution.
    pub fn new(engine: Arc<dyn RenderEngine>, settings: CaptureSettings) -> Self {
        let locator = Arc::new(DirectoryScanLocator::new(settings.capture_extension.clone()));
        Self {
            engine,
            scheduler: Arc::new(TokioScheduler),
            locator,
            settings,
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_locator(mut self, locator: Arc<dyn ArtifactLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn engine(&self) -> &Arc<dyn RenderEngine> {
        &self.engine
    }

    /// Record `document` for `duration_secs` and return the artifact.
    ///
    /// The surface is released before this returns, on every path.
    /// Errors: `InvalidSlideData` (bad duration or session id, before any
    /// engine call), `EngineUnavailable`, `LoadTimeout`, `Cancelled`,
    /// `ArtifactNotFound`, `IoFailure`.
    pub async fn capture(
        &self,
        document: &ComposedDocument,
        duration_secs: f64,
        options: CaptureOptions,
    ) -> SlidecastResult<ArtifactHandle> {
        validate_duration(duration_secs)?;
        if let Some(id) = &options.session_id {
            slidecast_slide_model::validate_session_id(id)?;
        }
        if options.cancel.is_cancelled() {
            return Err(SlidecastError::Cancelled);
        }

        let workspace = match &options.session_id {
            Some(id) => SessionWorkspace::create(&self.settings.work_dir, id)?,
            None => SessionWorkspace::create_unique(&self.settings.work_dir)?,
        };
        let destination = options.destination.clone().unwrap_or_else(|| {
            workspace.default_destination(options.slide_number, &self.settings.capture_extension)
        });
        let mut session = CaptureSession::new(workspace, duration_secs);
        let mut resources = EngineResources::new(self.engine.clone());

        tracing::info!(
            session_id = %session.id(),
            engine = self.engine.name(),
            duration_secs,
            dir = %session.workspace().dir().display(),
            "Starting capture session"
        );

        let result = self
            .run(
                &mut session,
                &mut resources,
                document,
                duration_secs,
                &destination,
                &options.cancel,
            )
            .await;

        if let Err(e) = &result {
            tracing::warn!(
                session_id = %session.id(),
                state = ?session.state(),
                error = %e,
                "Capture session failed"
            );
            session.transition(CaptureState::Failed);
        }

        self.cleanup(&session, &mut resources).await;
        if result.is_ok() {
            session.workspace().remove_if_empty();
        }
        session.transition(CaptureState::Closed);

        if let Ok(handle) = &result {
            tracing::info!(
                session_id = %session.id(),
                path = %handle.path.display(),
                size_bytes = handle.size_bytes,
                "Capture session resolved"
            );
        }
        result
    }

    async fn run(
        &self,
        session: &mut CaptureSession,
        resources: &mut EngineResources,
        document: &ComposedDocument,
        duration_secs: f64,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> SlidecastResult<ArtifactHandle> {
        let surface = self.engine.launch_surface(&self.settings.surface).await?;
        let surface = resources.surface.insert(surface);

        let recording = self
            .engine
            .begin_recording(
                surface,
                session.workspace().dir(),
                self.settings.surface.canvas,
            )
            .await?;
        resources.recording = Some(recording);
        resources.view_open = true;

        self.load(surface, document, cancel).await?;
        session.transition(CaptureState::Loaded);
        session.transition(CaptureState::Recording);

        let wait = secs_to_duration(duration_secs) + self.settings.safety_margin;
        tracing::debug!(session_id = %session.id(), wait_secs = wait.as_secs_f64(), "Waiting for timeline");
        if self.scheduler.after(wait, cancel).await == WaitOutcome::Cancelled {
            tracing::info!(session_id = %session.id(), "Capture cancelled; finalizing early");
            session.transition(CaptureState::Finalizing);
            if let Err(e) = self.finalize(resources).await {
                tracing::warn!(session_id = %session.id(), error = %e, "Finalize after cancel failed");
            }
            return Err(SlidecastError::Cancelled);
        }

        session.transition(CaptureState::Finalizing);
        let reported = self.finalize(resources).await?;
        let artifact = self
            .locator
            .locate(session.workspace().dir(), reported.as_deref())?;
        let handle = deliver(&artifact, destination, session.id())?;
        session.transition(CaptureState::Resolved);
        Ok(handle)
    }

    async fn load(
        &self,
        surface: &SurfaceHandle,
        document: &ComposedDocument,
        cancel: &CancellationToken,
    ) -> SlidecastResult<()> {
        let timeout = self.settings.load_timeout;
        let load = tokio::time::timeout(timeout, self.engine.load_document(surface, document));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SlidecastError::Cancelled),
            result = load => match result {
                Ok(loaded) => loaded,
                Err(_) => Err(SlidecastError::load_timeout(timeout.as_secs_f64())),
            },
        }
    }

    /// Close the view, then the recording. Each is attempted at most once.
    async fn finalize(&self, resources: &mut EngineResources) -> SlidecastResult<Option<PathBuf>> {
        if std::mem::take(&mut resources.view_open) {
            if let Some(surface) = resources.surface.as_ref() {
                self.engine.close_view(surface).await?;
            }
        }

        let Some(recording) = resources.recording.take() else {
            return Ok(None);
        };
        let timeout = self.settings.finalize_timeout;
        tokio::time::timeout(timeout, self.engine.close_recording(recording))
            .await
            .map_err(|_| {
                SlidecastError::engine_unavailable(format!(
                    "recording did not finalize within {}s",
                    timeout.as_secs_f64()
                ))
            })?
    }

    /// Finish whatever the session left open and release the surface.
    async fn cleanup(&self, session: &CaptureSession, resources: &mut EngineResources) {
        if resources.view_open || resources.recording.is_some() {
            if let Err(e) = self.finalize(resources).await {
                tracing::warn!(session_id = %session.id(), error = %e, "Finalize during cleanup failed");
            }
        }
        if let Some(surface) = resources.surface.take() {
            if let Err(e) = self.engine.release_surface(surface).await {
                tracing::warn!(session_id = %session.id(), error = %e, "Failed to release surface");
            }
        }
    }
}

/// Move the artifact to `destination`, which must not exist yet. On failure
/// the original stays where the engine left it.
fn deliver(artifact: &Path, destination: &Path, session_id: &str) -> SlidecastResult<ArtifactHandle> {
    if destination.symlink_metadata().is_ok() {
        return Err(SlidecastError::io_failure(
            destination,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "refusing to overwrite an existing file",
            ),
        ));
    }
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SlidecastError::io_failure(parent, e))?;
    }

    if let Err(rename_err) = std::fs::rename(artifact, destination) {
        // rename cannot cross filesystems; fall back to copy + remove.
        tracing::debug!(error = %rename_err, "Rename failed, copying artifact");
        if let Err(e) = std::fs::copy(artifact, destination) {
            let _ = std::fs::remove_file(destination);
            return Err(SlidecastError::io_failure(destination, e));
        }
        if let Err(e) = std::fs::remove_file(artifact) {
            tracing::warn!(path = %artifact.display(), error = %e, "Failed to remove moved artifact");
        }
    }

    let size_bytes = std::fs::metadata(destination).ok().map(|m| m.len());
    Ok(ArtifactHandle {
        path: destination.to_path_buf(),
        size_bytes,
        session_id: session_id.to_string(),
    })
}
