//! Compose a slide's animated document without recording it.

use std::path::PathBuf;

use slidecast_common::config::AppConfig;
use slidecast_common::error::SlidecastError;
use slidecast_slide_model::SlideSpec;
use slidecast_timeline::Composer;

pub fn run(
    config: &AppConfig,
    input: PathBuf,
    duration: f64,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let slide: SlideSpec = super::read_json(&input)?;
    let composer = Composer::new(config.composer.clone())
        .with_canvas(config.capture.canvas_width, config.capture.canvas_height);
    let document = composer.compose(&slide, duration)?;

    let timeline = document.timeline();
    tracing::info!(
        cues = timeline.cues.len(),
        last_cue_secs = timeline.last_delay_secs(),
        chart = document.has_chart(),
        "Composed slide"
    );

    match output {
        Some(path) => {
            std::fs::write(&path, document.html())
                .map_err(|e| SlidecastError::io_failure(&path, e))?;
            eprintln!("Document written to: {}", path.display());
        }
        None => print!("{}", document.html()),
    }
    Ok(())
}
