//! Render one slide to a video clip.

use std::path::PathBuf;

use slidecast_capture_engine::SlidePipeline;
use slidecast_common::config::AppConfig;
use slidecast_slide_model::RenderRequest;

pub async fn run(mut config: AppConfig, input: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let request: RenderRequest = super::read_json(&input)?;
    if let Some(dir) = output {
        config.capture.work_dir = dir;
    }

    let engine = super::recorder(&config).await?;
    let pipeline = SlidePipeline::from_config(&config, engine);
    let outcome = pipeline.render(request, super::cancel_on_ctrl_c()).await?;

    super::print_json(&outcome)
}
