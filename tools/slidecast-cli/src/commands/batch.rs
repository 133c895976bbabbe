//! Render a batch of slides.

use std::path::PathBuf;

use slidecast_capture_engine::SlidePipeline;
use slidecast_common::config::AppConfig;
use slidecast_slide_model::BatchRequest;

pub async fn run(
    mut config: AppConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    let batch: BatchRequest = super::read_json(&input)?;
    if let Some(dir) = output {
        config.capture.work_dir = dir;
    }
    if let Some(n) = concurrency {
        config.capture.max_concurrent_sessions = n;
    }

    let engine = super::recorder(&config).await?;
    let pipeline = SlidePipeline::from_config(&config, engine);
    let outcome = pipeline.render_batch(batch, super::cancel_on_ctrl_c()).await;
    super::print_json(&outcome)?;

    let failed = outcome.slides.iter().filter(|s| s.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} slides failed", outcome.slides.len());
    }
    Ok(())
}
