pub mod batch;
pub mod check;
pub mod compose;
pub mod render;

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use slidecast_capture_engine::{CancellationToken, ProcessEngine, RenderEngine};
use slidecast_common::config::AppConfig;
use slidecast_common::error::{SlidecastError, SlidecastResult};

/// Read a JSON request file. A malformed body is invalid slide data.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> SlidecastResult<T> {
    let content =
        std::fs::read_to_string(path).map_err(|e| SlidecastError::io_failure(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        SlidecastError::invalid_slide_data(format!("{}: {e}", path.display()))
    })
}

/// Write pretty JSON to stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The configured recorder, refused up front when it cannot be found.
pub async fn recorder(config: &AppConfig) -> SlidecastResult<Arc<dyn RenderEngine>> {
    let engine = ProcessEngine::from_config(&config.engine);
    if !engine.is_available().await {
        return Err(SlidecastError::engine_unavailable(format!(
            "recorder program '{}' not found",
            config.engine.program.display()
        )));
    }
    Ok(Arc::new(engine))
}

/// A token cancelled on Ctrl+C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted; cancelling capture");
            trigger.cancel();
        }
    });
    cancel
}
