//! Resolving where the engine put the capture.

use std::path::{Path, PathBuf};

use slidecast_common::error::{SlidecastError, SlidecastResult};

/// Finds the artifact a finished recording produced.
pub trait ArtifactLocator: Send + Sync {
    /// `session_dir` is the session's exclusive output directory;
    /// `reported` is the path the engine returned, if any.
    fn locate(&self, session_dir: &Path, reported: Option<&Path>) -> SlidecastResult<PathBuf>;
}

/// Resolves by scanning the session directory for the capture extension.
///
/// The directory is created empty for one session, so at most one capture
/// can appear in it; names are sorted so the choice is stable regardless.
#[derive(Debug, Clone)]
pub struct DirectoryScanLocator {
    extension: String,
}

impl DirectoryScanLocator {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn matches(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

impl ArtifactLocator for DirectoryScanLocator {
    fn locate(&self, session_dir: &Path, reported: Option<&Path>) -> SlidecastResult<PathBuf> {
        if let Some(path) = reported {
            // Only trust a reported path that lives in this session's directory.
            if let Some(resolved) = resolve_within(session_dir, path) {
                return Ok(resolved);
            }
            tracing::warn!(
                reported = %path.display(),
                session_dir = %session_dir.display(),
                "Ignoring engine-reported artifact outside the session directory"
            );
        }

        let entries = std::fs::read_dir(session_dir)
            .map_err(|e| SlidecastError::io_failure(session_dir, e))?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| self.matches(path))
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| SlidecastError::artifact_not_found(session_dir))
    }
}

/// `path` with `..` and symlinks resolved, if it is a file inside `dir`.
fn resolve_within(dir: &Path, path: &Path) -> Option<PathBuf> {
    let dir = dir.canonicalize().ok()?;
    let path = path.canonicalize().ok()?;
    (path.starts_with(&dir) && path.is_file()).then_some(path)
}
