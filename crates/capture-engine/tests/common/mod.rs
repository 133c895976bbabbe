//! Fake rendering engine for orchestrator tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use slidecast_capture_engine::{
    CaptureOrchestrator, CaptureSettings, FrameSize, RecordingContext, RenderEngine,
    SurfaceConfig, SurfaceHandle,
};
use slidecast_common::error::{SlidecastError, SlidecastResult};
use slidecast_slide_model::SlideSpec;
use slidecast_common::config::{ComposerConfig, OverrunPolicy};
use slidecast_timeline::{ComposedDocument, Composer};

/// Step at which the fake engine misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    Launch,
    BeginRecording,
    Load,
    NeverIdle,
    CloseView,
    CloseRecording,
    NoArtifact,
    Release,
}

impl Fault {
    pub const ALL: [Fault; 9] = [
        Fault::None,
        Fault::Launch,
        Fault::BeginRecording,
        Fault::Load,
        Fault::NeverIdle,
        Fault::CloseView,
        Fault::CloseRecording,
        Fault::NoArtifact,
        Fault::Release,
    ];
}

#[derive(Default)]
pub struct Counters {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub loads: AtomicUsize,
    pub views_closed: AtomicUsize,
    pub recordings_closed: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Counters {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn recordings_closed(&self) -> usize {
        self.recordings_closed.load(Ordering::SeqCst)
    }

    pub fn views_closed(&self) -> usize {
        self.views_closed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Engine double that writes a capture named after a counter, containing
/// the session directory's name, when its recording is closed.
pub struct FakeEngine {
    pub fault: Fault,
    pub counters: Arc<Counters>,
    /// Delay before the artifact appears, keyed by session directory name.
    pub artifact_delays: HashMap<String, Duration>,
    /// Report the artifact path from `close_recording`.
    pub report_path: bool,
    next_id: AtomicU64,
    outputs: Mutex<HashMap<u64, PathBuf>>,
}

impl FakeEngine {
    pub fn new(fault: Fault) -> Self {
        Self {
            fault,
            counters: Arc::new(Counters::default()),
            artifact_delays: HashMap::new(),
            report_path: false,
            next_id: AtomicU64::new(1),
            outputs: Mutex::new(HashMap::new()),
        }
    }

    fn fail(&self, step: Fault) -> SlidecastResult<()> {
        if self.fault == step {
            Err(SlidecastError::engine_unavailable(format!("injected {step:?}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl RenderEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn launch_surface(&self, _config: &SurfaceConfig) -> SlidecastResult<SurfaceHandle> {
        self.fail(Fault::Launch)?;
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Ok(SurfaceHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn begin_recording(
        &self,
        surface: &SurfaceHandle,
        output_dir: &Path,
        _frame: FrameSize,
    ) -> SlidecastResult<RecordingContext> {
        self.fail(Fault::BeginRecording)?;
        self.outputs
            .lock()
            .unwrap()
            .insert(surface.id(), output_dir.to_path_buf());
        Ok(RecordingContext::new(surface.id(), output_dir))
    }

    async fn load_document(
        &self,
        _surface: &SurfaceHandle,
        _document: &ComposedDocument,
    ) -> SlidecastResult<()> {
        self.counters.loads.fetch_add(1, Ordering::SeqCst);
        if self.fault == Fault::NeverIdle {
            std::future::pending::<()>().await;
        }
        self.fail(Fault::Load)
    }

    async fn close_view(&self, _surface: &SurfaceHandle) -> SlidecastResult<()> {
        self.counters.views_closed.fetch_add(1, Ordering::SeqCst);
        self.fail(Fault::CloseView)
    }

    async fn close_recording(
        &self,
        recording: RecordingContext,
    ) -> SlidecastResult<Option<PathBuf>> {
        self.counters.recordings_closed.fetch_add(1, Ordering::SeqCst);
        self.fail(Fault::CloseRecording)?;
        if self.fault == Fault::NoArtifact {
            return Ok(None);
        }

        let dir = recording.output_dir().to_path_buf();
        let session = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(delay) = self.artifact_delays.get(&session) {
            tokio::time::sleep(*delay).await;
        }

        let path = dir.join(format!("{:08x}.webm", recording.id() * 7919));
        std::fs::write(&path, session.as_bytes()).unwrap();
        Ok(self.report_path.then_some(path))
    }

    async fn release_surface(&self, surface: SurfaceHandle) -> SlidecastResult<()> {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outputs.lock().unwrap().remove(&surface.id());
        self.fail(Fault::Release)
    }
}

pub fn orchestrator(engine: FakeEngine, work_dir: &Path) -> (CaptureOrchestrator, Arc<Counters>) {
    let counters = engine.counters.clone();
    let orchestrator =
        CaptureOrchestrator::new(Arc::new(engine), CaptureSettings::with_work_dir(work_dir));
    (orchestrator, counters)
}

/// A two-bullet slide. Cues are clamped so short test durations still
/// compose.
pub fn document(duration_secs: f64) -> ComposedDocument {
    let mut slide = SlideSpec::titled("Q3 Results");
    slide.bullets = vec!["Revenue up 12%".into(), "Costs down 4%".into()];
    let config = ComposerConfig {
        overrun: OverrunPolicy::Clamp,
        ..ComposerConfig::default()
    };
    Composer::new(config)
        .compose(&slide, duration_secs)
        .unwrap()
}
