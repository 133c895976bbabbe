use std::path::{Path, PathBuf};

use slidecast_common::error::SlidecastResult;
use slidecast_timeline::ComposedDocument;

pub mod process;

pub use process::ProcessEngine;

/// Logical frame size of a surface or recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// How a rendering surface should be launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub headless: bool,
    pub sandbox_disabled: bool,
    pub canvas: FrameSize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox_disabled: true,
            canvas: FrameSize::default(),
        }
    }
}

/// Opaque handle to one launched surface. Not `Clone`: exactly one owner
/// releases it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SurfaceHandle {
    id: u64,
}

impl SurfaceHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Opaque handle to a recording bound to a surface.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RecordingContext {
    id: u64,
    output_dir: PathBuf,
}

impl RecordingContext {
    pub fn new(id: u64, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            id,
            output_dir: output_dir.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Directory the engine writes the capture into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// The headless rendering engine a capture session drives.
///
/// Implementations must support several surfaces at once; every method
/// takes `&self` and the engine keeps per-handle state internally.
#[async_trait::async_trait]
pub trait RenderEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Acquire a new surface. Fails with `EngineUnavailable`.
    async fn launch_surface(&self, config: &SurfaceConfig) -> SlidecastResult<SurfaceHandle>;

    /// Start continuously recording `surface` into `output_dir`.
    async fn begin_recording(
        &self,
        surface: &SurfaceHandle,
        output_dir: &Path,
        frame: FrameSize,
    ) -> SlidecastResult<RecordingContext>;

    /// Load the document and resolve once the engine reports resource-idle.
    ///
    /// Callers bound this with their own timeout; an implementation may
    /// also fail with `LoadTimeout` on its own.
    async fn load_document(
        &self,
        surface: &SurfaceHandle,
        document: &ComposedDocument,
    ) -> SlidecastResult<()>;

    /// Close the page showing the document.
    async fn close_view(&self, surface: &SurfaceHandle) -> SlidecastResult<()>;

    /// Close the recording, flushing the artifact to disk.
    ///
    /// Engines that know the artifact's path return it; `None` leaves
    /// resolution to the artifact locator.
    async fn close_recording(&self, recording: RecordingContext)
        -> SlidecastResult<Option<PathBuf>>;

    /// Release the surface and everything the engine holds for it.
    async fn release_surface(&self, surface: SurfaceHandle) -> SlidecastResult<()>;

    /// Whether the engine can currently launch surfaces.
    async fn is_available(&self) -> bool {
        true
    }
}
