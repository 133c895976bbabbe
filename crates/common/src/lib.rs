//! Slidecast Common Utilities
//!
//! Shared infrastructure for all Slidecast crates:
//! - Error taxonomy and the structured error report handed to callers
//! - Render clock for wall-clock render timing
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
