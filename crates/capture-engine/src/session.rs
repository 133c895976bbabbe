//! Capture session state.

use crate::workspace::SessionWorkspace;

/// State of a capture session.
///
/// ```text
/// Created → Loaded → Recording → Finalizing → Resolved → Closed
///    └────────┴──────────┴────────────┴──────────┴→ Failed → Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureState {
    /// Surface being acquired, recording enabled, document loading.
    Created,
    /// Document reached resource-idle.
    Loaded,
    /// Timeline playing out.
    Recording,
    /// View and recording closing; artifact being flushed.
    Finalizing,
    /// Artifact found and moved to its destination.
    Resolved,
    /// A step failed or the caller cancelled.
    Failed,
    /// Surface released. Terminal.
    Closed,
}

impl CaptureState {
    fn rank(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Loaded => 1,
            Self::Recording => 2,
            Self::Finalizing => 3,
            Self::Resolved => 4,
            Self::Failed => 5,
            Self::Closed => 6,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: CaptureState) -> bool {
        match (self, next) {
            (Self::Closed, _) => false,
            (Self::Failed, next) => next == Self::Closed,
            (_, Self::Failed) => true,
            (Self::Resolved, next) => next == Self::Closed,
            (_, Self::Closed) => false,
            (current, next) => next.rank() == current.rank() + 1,
        }
    }
}

/// One in-flight capture: its workspace and where it is in its lifecycle.
#[derive(Debug)]
pub struct CaptureSession {
    workspace: SessionWorkspace,
    requested_duration_secs: f64,
    state: CaptureState,
    history: Vec<CaptureState>,
}

impl CaptureSession {
    pub fn new(workspace: SessionWorkspace, requested_duration_secs: f64) -> Self {
        Self {
            workspace,
            requested_duration_secs,
            state: CaptureState::Created,
            history: vec![CaptureState::Created],
        }
    }

    pub fn id(&self) -> &str {
        self.workspace.session_id()
    }

    pub fn workspace(&self) -> &SessionWorkspace {
        &self.workspace
    }

    pub fn requested_duration_secs(&self) -> f64 {
        self.requested_duration_secs
    }

    /// Current session state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Every state the session has been in, in order.
    pub fn history(&self) -> &[CaptureState] {
        &self.history
    }

    /// Move to `next`, returning false and leaving the state unchanged when
    /// the transition is illegal.
    pub fn transition(&mut self, next: CaptureState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::error!(
                session_id = %self.id(),
                from = ?self.state,
                to = ?next,
                "Illegal capture state transition"
            );
            return false;
        }
        tracing::debug!(session_id = %self.id(), from = ?self.state, to = ?next, "Capture state");
        self.state = next;
        self.history.push(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CaptureState::*;

    #[test]
    fn test_forward_path() {
        let path = [Created, Loaded, Recording, Finalizing, Resolved, Closed];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{pair:?}");
        }
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!Created.can_transition_to(Recording));
        assert!(!Recording.can_transition_to(Loaded));
        assert!(!Finalizing.can_transition_to(Created));
        assert!(!Created.can_transition_to(Closed));
    }

    #[test]
    fn test_failed_reachable_from_every_non_terminal_state() {
        for state in [Created, Loaded, Recording, Finalizing, Resolved] {
            assert!(state.can_transition_to(Failed), "{state:?}");
        }
        assert!(!Closed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Closed));
    }

    #[test]
    fn test_closed_is_terminal() {
        assert!(Closed.is_terminal());
        for state in [Created, Loaded, Recording, Finalizing, Resolved, Failed, Closed] {
            assert!(!Closed.can_transition_to(state));
        }
    }

    #[test]
    fn test_session_records_history() {
        let root = tempfile::tempdir().unwrap();
        let ws = SessionWorkspace::create(root.path(), "hist").unwrap();
        let mut session = CaptureSession::new(ws, 5.0);

        assert!(session.transition(Loaded));
        assert!(session.transition(Failed));
        assert!(session.transition(Closed));
        assert_eq!(session.history(), &[Created, Loaded, Failed, Closed]);
        assert_eq!(session.state(), Closed);
        assert!(!session.transition(Loaded));
    }
}
