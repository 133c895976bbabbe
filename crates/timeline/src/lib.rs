//! Slidecast Timeline Composer
//!
//! Turns a slide description into an animated document ready for capture:
//! - **Schedule:** Derive the staggered cue timeline (title, bullets, chart bars)
//! - **Document:** Emit a self-contained HTML page with embedded styles and
//!   keyframes that play the schedule out
//!
//! This crate is pure computation — no I/O, no engine interaction.
//! The same slide and duration always produce a byte-identical document.

pub mod compose;
pub mod cue;
pub mod document;
mod html;

pub use compose::{compose, Composer};
pub use cue::{AnimationKind, Cue, CueTarget, Timeline};
pub use document::{BarLayout, ComposedDocument};
