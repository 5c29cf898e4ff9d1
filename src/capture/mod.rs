// src/capture/mod.rs

//! In-memory output capture.
//!
//! - [`bounded`] holds [`BoundedCaptureSink`], a fixed-capacity buffer that
//!   silently drops whatever does not fit.
//! - [`mirror`] holds the optional side channel that echoes accepted bytes
//!   into the log.

pub mod bounded;
pub mod mirror;

pub use bounded::BoundedCaptureSink;
pub use mirror::{LogMirror, TracingMirror};
