//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SlidecastError, SlidecastResult};

/// Smallest gap between consecutive cues of one stagger.
pub const MIN_CUE_GAP_SECS: f64 = 0.001;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Timeline composition settings.
    pub composer: ComposerConfig,

    /// Capture session settings.
    pub capture: CaptureConfig,

    /// External rendering engine settings.
    pub engine: EngineConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Timing constants for the slide animation timeline (seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Delay before the title fades in.
    pub title_delay: f64,

    /// Delay before the first bullet fades in.
    pub base_bullet_delay: f64,

    /// Gap between consecutive bullets.
    pub bullet_gap: f64,

    /// Delay before the first chart bar appears.
    pub chart_delay: f64,

    /// Gap between consecutive chart bars.
    pub bar_gap: f64,

    /// What to do with cues scheduled past the slide duration.
    pub overrun: OverrunPolicy,
}

/// Policy for cues whose delay exceeds the slide duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrunPolicy {
    /// Fail composition with `InvalidSlideData`.
    #[default]
    Reject,
    /// Pull late cues back to the slide duration. Every cue past the end
    /// lands on the same instant, so the trailing part of a stagger is no
    /// longer strictly increasing.
    Clamp,
}

/// Capture session parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Root under which every session gets its own directory.
    pub work_dir: PathBuf,

    /// Logical canvas width.
    pub canvas_width: u32,

    /// Logical canvas height.
    pub canvas_height: u32,

    /// Extra wait after the timeline to let the last animation settle.
    pub safety_margin_secs: f64,

    /// Upper bound for reaching the resource-idle signal.
    pub load_timeout_secs: f64,

    /// Upper bound for flushing the recording on close.
    pub finalize_timeout_secs: f64,

    /// Extension of the artifact the engine writes (without the dot).
    pub capture_extension: String,

    /// How many capture sessions a batch may run at once.
    pub max_concurrent_sessions: usize,
}

/// External recorder process configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recorder executable.
    pub program: PathBuf,

    /// Extra arguments placed before the generated ones.
    pub args: Vec<String>,

    /// Run the browser without a visible window.
    pub headless: bool,

    /// Disable the browser sandbox (needed in most containers).
    pub sandbox_disabled: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "slidecast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            title_delay: 0.3,
            base_bullet_delay: 0.8,
            bullet_gap: 0.4,
            chart_delay: 1.5,
            bar_gap: 0.3,
            overrun: OverrunPolicy::Reject,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            canvas_width: 1920,
            canvas_height: 1080,
            safety_margin_secs: 0.5,
            load_timeout_secs: 30.0,
            finalize_timeout_secs: 15.0,
            capture_extension: "webm".to_string(),
            max_concurrent_sessions: 1,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("slidecast-recorder"),
            args: Vec::new(),
            headless: true,
            sandbox_disabled: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit file. Missing fields take defaults.
    pub fn load_from(path: &Path) -> SlidecastResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SlidecastError::config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| SlidecastError::config(format!("cannot parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> SlidecastResult<()> {
        let c = &self.composer;
        for (name, value) in [
            ("composer.title_delay", c.title_delay),
            ("composer.base_bullet_delay", c.base_bullet_delay),
            ("composer.bullet_gap", c.bullet_gap),
            ("composer.chart_delay", c.chart_delay),
            ("composer.bar_gap", c.bar_gap),
            ("capture.safety_margin_secs", self.capture.safety_margin_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SlidecastError::config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        // Cue delays are kept to the millisecond; smaller gaps would collapse.
        for (name, gap) in [
            ("composer.bullet_gap", c.bullet_gap),
            ("composer.bar_gap", c.bar_gap),
        ] {
            if gap < MIN_CUE_GAP_SECS {
                return Err(SlidecastError::config(format!(
                    "{name} must be at least {MIN_CUE_GAP_SECS}s, got {gap}"
                )));
            }
        }
        for (name, value) in [
            ("capture.load_timeout_secs", self.capture.load_timeout_secs),
            (
                "capture.finalize_timeout_secs",
                self.capture.finalize_timeout_secs,
            ),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SlidecastError::config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.capture.canvas_width == 0 || self.capture.canvas_height == 0 {
            return Err(SlidecastError::config("canvas size must be non-zero"));
        }
        if self.capture.max_concurrent_sessions == 0 {
            return Err(SlidecastError::config(
                "capture.max_concurrent_sessions must be at least 1",
            ));
        }
        if self.capture.capture_extension.is_empty()
            || self.capture.capture_extension.contains(['.', '/'])
        {
            return Err(SlidecastError::config(
                "capture.capture_extension must be a bare extension like \"webm\"",
            ));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    xdg_base("XDG_CONFIG_HOME", ".config")
        .join("slidecast")
        .join("config.json")
}

/// Default capture work directory.
fn default_work_dir() -> PathBuf {
    xdg_base("XDG_CACHE_HOME", ".cache")
        .join("slidecast")
        .join("captures")
}

fn xdg_base(var: &str, home_fallback: &str) -> PathBuf {
    std::env::var(var).map(PathBuf::from).unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(home_fallback)
    })
}
