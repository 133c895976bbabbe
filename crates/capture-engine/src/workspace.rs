//! Per-session output directories.
//!
//! Every capture session records into its own freshly created directory
//! under the configured work root:
//!
//! ```text
//! <work_dir>/
//! ├── <session_id>/           exclusive to one session while it runs
//! │   └── <engine-named>.webm
//! └── slide_<n>_<session_id>.webm   final artifact after resolution
//! ```

use std::path::{Path, PathBuf};

use slidecast_common::error::{SlidecastError, SlidecastResult};
use slidecast_slide_model::validate_session_id;

/// A session's identity and exclusive output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWorkspace {
    session_id: String,
    root: PathBuf,
    dir: PathBuf,
}

impl SessionWorkspace {
    /// Create `<root>/<session_id>`. Fails if the directory already exists,
    /// so two sessions can never share one.
    pub fn create(root: &Path, session_id: &str) -> SlidecastResult<Self> {
        validate_session_id(session_id)?;
        std::fs::create_dir_all(root).map_err(|e| SlidecastError::io_failure(root, e))?;

        let dir = root.join(session_id);
        std::fs::create_dir(&dir).map_err(|e| SlidecastError::io_failure(&dir, e))?;

        Ok(Self {
            session_id: session_id.to_string(),
            root: root.to_path_buf(),
            dir,
        })
    }

    /// Create a workspace with a generated identifier.
    pub fn create_unique(root: &Path) -> SlidecastResult<Self> {
        Self::create(root, &generate_session_id())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The session's exclusive output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Default location for the resolved artifact.
    pub fn default_destination(&self, slide_number: u32, extension: &str) -> PathBuf {
        self.root.join(format!(
            "slide_{slide_number}_{}.{extension}",
            self.session_id
        ))
    }

    /// Remove the session directory if nothing is left in it.
    pub fn remove_if_empty(&self) -> bool {
        std::fs::remove_dir(&self.dir).is_ok()
    }
}

/// A fresh random session identifier.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
