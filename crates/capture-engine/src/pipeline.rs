//! End-to-end slide rendering: validate, compose, capture.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use slidecast_common::clock::RenderClock;
use slidecast_common::config::AppConfig;
use slidecast_common::error::{ErrorReport, SlidecastError, SlidecastResult};
use slidecast_slide_model::{BatchRequest, RenderRequest};
use slidecast_timeline::Composer;

use crate::engine::RenderEngine;
use crate::orchestrator::{ArtifactHandle, CaptureOptions, CaptureOrchestrator, CaptureSettings};

/// A rendered slide: the artifact plus how long the render took.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutcome {
    pub slide_number: u32,
    pub artifact: ArtifactHandle,

    /// Wall-clock seconds from request to resolved artifact.
    pub render_time_secs: f64,
}

/// Result of one slide within a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub slide_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RenderOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

/// Results of a batch, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub success: bool,
    pub slides: Vec<BatchEntry>,
}

/// Composes slides and captures them, with a bound on how many capture
/// sessions run at once.
pub struct SlidePipeline {
    composer: Composer,
    orchestrator: CaptureOrchestrator,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl SlidePipeline {
    /// `max_concurrent` of 1 renders strictly one slide after another.
    pub fn new(composer: Composer, orchestrator: CaptureOrchestrator, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            composer,
            orchestrator,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Build the pipeline described by `config` around `engine`.
    pub fn from_config(config: &AppConfig, engine: Arc<dyn RenderEngine>) -> Self {
        let composer = Composer::new(config.composer.clone())
            .with_canvas(config.capture.canvas_width, config.capture.canvas_height);
        let settings = CaptureSettings::from_config(&config.capture, &config.engine);
        let orchestrator = CaptureOrchestrator::new(engine, settings);
        Self::new(composer, orchestrator, config.capture.max_concurrent_sessions)
    }

    pub fn orchestrator(&self) -> &CaptureOrchestrator {
        &self.orchestrator
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Render one slide. Invalid requests fail before any engine work.
    pub async fn render(
        &self,
        request: RenderRequest,
        cancel: CancellationToken,
    ) -> SlidecastResult<RenderOutcome> {
        let clock = RenderClock::start();
        request.validate()?;
        let slide_number = request.slide_number();
        let document = self.composer.compose(&request.slide_data, request.duration)?;

        let _permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SlidecastError::Cancelled),
            permit = self.permits.acquire() => permit.map_err(|_| SlidecastError::Cancelled)?,
        };

        tracing::info!(
            slide_number,
            duration_secs = request.duration,
            started_at = clock.epoch_wall(),
            "Rendering slide"
        );

        let artifact = self
            .orchestrator
            .capture(
                &document,
                request.duration,
                CaptureOptions {
                    session_id: request.session_id.clone(),
                    slide_number,
                    destination: None,
                    cancel,
                },
            )
            .await?;

        let render_time_secs = clock.elapsed_secs_rounded();
        tracing::info!(slide_number, render_time_secs, "Render completed");
        Ok(RenderOutcome {
            slide_number,
            artifact,
            render_time_secs,
        })
    }

    /// Render every slide of a batch. One slide failing does not stop the
    /// others; cancelling `cancel` aborts all of them.
    pub async fn render_batch(&self, batch: BatchRequest, cancel: CancellationToken) -> BatchOutcome {
        let requests = batch.numbered();
        tracing::info!(
            slides = requests.len(),
            max_concurrent = self.max_concurrent,
            "Rendering batch"
        );

        let renders = requests.into_iter().map(|request| {
            let slide_number = request.slide_number();
            let cancel = cancel.child_token();
            async move { (slide_number, self.render(request, cancel).await) }
        });
        let results = futures::future::join_all(renders).await;

        let slides: Vec<BatchEntry> = results
            .into_iter()
            .map(|(slide_number, result)| match result {
                Ok(outcome) => BatchEntry {
                    slide_number,
                    outcome: Some(outcome),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(slide_number, error = %e, "Slide failed in batch");
                    BatchEntry {
                        slide_number,
                        outcome: None,
                        error: Some(e.report()),
                    }
                }
            })
            .collect();

        BatchOutcome {
            success: slides.iter().all(|s| s.error.is_none()),
            slides,
        }
    }
}
