// src/exec/mod.rs

//! Process execution layer.
//!
//! This module launches one OS process per call using
//! `tokio::process::Command`, wires its output into a sink and optionally
//! waits for it under a deadline.
//!
//! - [`command`] resolves the executable, arguments, environment and working
//!   directory into a [`ResolvedCommand`].
//! - [`resolver`] decides where output goes and where stdin comes from.
//! - [`sink`] defines the [`OutputSink`] trait shared by both output pumps.
//! - [`pump`] contains [`StreamPump`], the background copier for one stream.
//! - [`launcher`] owns the launch state machine ([`ProcessLauncher`]).
//! - [`result`] holds what a launch returns ([`ExecutionResult`]).

pub mod command;
pub mod launcher;
pub mod pump;
pub mod resolver;
pub mod result;
pub mod sink;

pub use command::ResolvedCommand;
pub use launcher::{ProcessLauncher, launch};
pub use pump::{PumpExit, PumpGroup, PumpHandle, PumpReport, StreamPump};
pub use resolver::{InputSource, OutputDestination, resolve_input, resolve_output};
pub use result::{ExecutionResult, LaunchOutcome};
pub use sink::{FileSink, OutputSink, SharedSink, WriterSink};
