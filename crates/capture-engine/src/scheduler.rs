//! Timed completion with an explicit cancellation hook.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How a scheduled wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Drives the capture state machine forward after a delay, or as soon as
/// the caller cancels.
#[async_trait::async_trait]
pub trait Scheduler: Send + Sync {
    async fn after(&self, delay: Duration, cancel: &CancellationToken) -> WaitOutcome;
}

/// Scheduler backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[async_trait::async_trait]
impl Scheduler for TokioScheduler {
    async fn after(&self, delay: Duration, cancel: &CancellationToken) -> WaitOutcome {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => WaitOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => WaitOutcome::Elapsed,
        }
    }
}
