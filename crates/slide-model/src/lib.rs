//! Slidecast Slide Model
//!
//! Defines the data contracts that enter the render pipeline:
//! - **Slide:** Title, bullets, and optional chart data for one slide
//! - **Request:** A slide plus its duration and numbering, singly or batched
//!
//! Both the current field names (`text`, `bullets`, `visualKind`,
//! `visualData`) and the legacy upper-case ones (`SLIDE_TEXT`, ...) are
//! accepted on the wire.

pub mod request;
pub mod slide;

pub use request::*;
pub use slide::*;
