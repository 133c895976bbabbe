//! Rendering engine backed by an external recorder process.
//!
//! The recorder (typically a small Playwright/Chromium driver) speaks a
//! line protocol:
//!
//! ```text
//! slidecast → recorder   argv: --document <html> --output-dir <dir>
//!                              --width <w> --height <h> [--headless] [--no-sandbox]
//! recorder → slidecast   stdout "idle"             document reached resource-idle
//! slidecast → recorder   stdin EOF                 close the page and the recording
//! recorder → slidecast   stdout "artifact <path>"  optional, before exiting
//! recorder → slidecast   stdout "error <message>"  fatal, before exiting
//! ```
//!
//! The recorder exits once the capture is flushed to disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use slidecast_common::config::EngineConfig;
use slidecast_common::error::{SlidecastError, SlidecastResult};
use slidecast_timeline::ComposedDocument;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use super::{FrameSize, RecordingContext, RenderEngine, SurfaceConfig, SurfaceHandle};

const DOCUMENT_FILE: &str = "slide.html";

#[derive(Default)]
struct SurfaceState {
    config: SurfaceConfig,
    output_dir: Option<PathBuf>,
    frame: FrameSize,
    document_path: Option<PathBuf>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<Lines<BufReader<ChildStdout>>>,
}

type SharedSurface = Arc<tokio::sync::Mutex<SurfaceState>>;

/// Engine that spawns one recorder process per surface.
pub struct ProcessEngine {
    program: PathBuf,
    args: Vec<String>,
    next_id: AtomicU64,
    surfaces: Mutex<HashMap<u64, SharedSurface>>,
}

impl ProcessEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            next_id: AtomicU64::new(1),
            surfaces: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    /// Resolve the recorder executable, searching `PATH` for bare names.
    pub fn resolve_program(&self) -> Option<PathBuf> {
        if self.program.components().count() > 1 {
            return self.program.is_file().then(|| self.program.clone());
        }
        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| candidate.is_file())
    }

    fn surface(&self, handle: &SurfaceHandle) -> SlidecastResult<SharedSurface> {
        let surfaces = self
            .surfaces
            .lock()
            .map_err(|_| SlidecastError::engine_unavailable("surface table poisoned"))?;
        surfaces.get(&handle.id()).cloned().ok_or_else(|| {
            SlidecastError::engine_unavailable(format!("unknown surface {}", handle.id()))
        })
    }

    fn command(&self, state: &SurfaceState, document: &Path, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--document")
            .arg(document)
            .arg("--output-dir")
            .arg(output_dir)
            .arg("--width")
            .arg(state.frame.width.to_string())
            .arg("--height")
            .arg(state.frame.height.to_string());
        if state.config.headless {
            cmd.arg("--headless");
        }
        if state.config.sandbox_disabled {
            cmd.arg("--no-sandbox");
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait::async_trait]
impl RenderEngine for ProcessEngine {
    fn name(&self) -> &str {
        "process"
    }

    async fn launch_surface(&self, config: &SurfaceConfig) -> SlidecastResult<SurfaceHandle> {
        if self.resolve_program().is_none() {
            return Err(SlidecastError::engine_unavailable(format!(
                "recorder program {} not found",
                self.program.display()
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let state = SurfaceState {
            config: config.clone(),
            frame: config.canvas,
            ..SurfaceState::default()
        };
        self.surfaces
            .lock()
            .map_err(|_| SlidecastError::engine_unavailable("surface table poisoned"))?
            .insert(id, Arc::new(tokio::sync::Mutex::new(state)));

        tracing::debug!(surface = id, program = %self.program.display(), "Surface launched");
        Ok(SurfaceHandle::new(id))
    }

    async fn begin_recording(
        &self,
        surface: &SurfaceHandle,
        output_dir: &Path,
        frame: FrameSize,
    ) -> SlidecastResult<RecordingContext> {
        let shared = self.surface(surface)?;
        let mut state = shared.lock().await;
        state.output_dir = Some(output_dir.to_path_buf());
        state.frame = frame;
        Ok(RecordingContext::new(surface.id(), output_dir))
    }

    async fn load_document(
        &self,
        surface: &SurfaceHandle,
        document: &ComposedDocument,
    ) -> SlidecastResult<()> {
        let shared = self.surface(surface)?;
        let mut state = shared.lock().await;

        let output_dir = state.output_dir.clone().ok_or_else(|| {
            SlidecastError::engine_unavailable("recording must begin before loading a document")
        })?;
        let document_path = output_dir.join(DOCUMENT_FILE);
        tokio::fs::write(&document_path, document.html())
            .await
            .map_err(|e| SlidecastError::io_failure(&document_path, e))?;
        state.document_path = Some(document_path.clone());

        let mut child = self
            .command(&state, &document_path, &output_dir)
            .spawn()
            .map_err(|e| {
                SlidecastError::engine_unavailable(format!(
                    "failed to start {}: {e}",
                    self.program.display()
                ))
            })?;
        tracing::info!(surface = surface.id(), pid = child.id(), "Recorder process started");

        state.stdin = child.stdin.take();
        let mut lines = child
            .stdout
            .take()
            .map(|stdout| BufReader::new(stdout).lines())
            .ok_or_else(|| SlidecastError::engine_unavailable("recorder stdout not captured"))?;
        state.child = Some(child);

        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|e| SlidecastError::engine_unavailable(format!("recorder stdout: {e}")))?;
            match line.as_deref().map(str::trim) {
                Some("idle") => break,
                Some(msg) if msg.starts_with("error") => {
                    return Err(SlidecastError::engine_unavailable(format!(
                        "recorder failed to load document: {}",
                        msg.trim_start_matches("error").trim()
                    )));
                }
                Some(other) => tracing::trace!(surface = surface.id(), line = other, "Recorder"),
                None => {
                    return Err(SlidecastError::engine_unavailable(
                        "recorder exited before the document reached resource-idle",
                    ));
                }
            }
        }

        state.stdout = Some(lines);
        Ok(())
    }

    async fn close_view(&self, surface: &SurfaceHandle) -> SlidecastResult<()> {
        let shared = self.surface(surface)?;
        let mut state = shared.lock().await;
        // Dropping stdin is the recorder's signal to close the page.
        state.stdin.take();
        Ok(())
    }

    async fn close_recording(
        &self,
        recording: RecordingContext,
    ) -> SlidecastResult<Option<PathBuf>> {
        let shared = self.surface(&SurfaceHandle::new(recording.id()))?;
        let mut state = shared.lock().await;
        state.stdin.take();

        let mut reported = None;
        let mut failure = None;
        if let Some(mut lines) = state.stdout.take() {
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if let Some(path) = line.strip_prefix("artifact ") {
                    reported = Some(PathBuf::from(path.trim()));
                } else if let Some(msg) = line.strip_prefix("error") {
                    failure = Some(msg.trim().to_string());
                }
            }
        }

        if let Some(mut child) = state.child.take() {
            let status = child.wait().await.map_err(|e| {
                SlidecastError::engine_unavailable(format!("failed to wait on recorder: {e}"))
            })?;
            if !status.success() {
                return Err(SlidecastError::engine_unavailable(format!(
                    "recorder exited with {status}: {}",
                    failure.unwrap_or_default()
                )));
            }
        }

        if let Some(msg) = failure {
            return Err(SlidecastError::engine_unavailable(format!(
                "recorder failed to finalize: {msg}"
            )));
        }
        Ok(reported)
    }

    async fn release_surface(&self, surface: SurfaceHandle) -> SlidecastResult<()> {
        let shared = self
            .surfaces
            .lock()
            .map_err(|_| SlidecastError::engine_unavailable("surface table poisoned"))?
            .remove(&surface.id());
        let Some(shared) = shared else {
            return Ok(());
        };

        let mut state = shared.lock().await;
        state.stdin.take();
        state.stdout.take();
        if let Some(mut child) = state.child.take() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(surface = surface.id(), error = %e, "Recorder already gone");
            }
            let _ = child.wait().await;
        }
        if let Some(path) = state.document_path.take() {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::debug!(path = %path.display(), error = %e, "Document already removed");
            }
        }

        tracing::debug!(surface = surface.id(), "Surface released");
        Ok(())
    }

    async fn is_available(&self) -> bool {
        self.resolve_program().is_some()
    }
}
