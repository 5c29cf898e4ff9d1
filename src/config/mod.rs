// src/config/mod.rs

//! Launch configuration.
//!
//! Responsibilities:
//! - Define the strongly typed launch contract and its TOML mirror (`model.rs`).
//! - Load a launch file from disk (`loader.rs`).
//! - Validate static invariants shared by the loader and the launcher (`validate.rs`).
//! - Resolve process-wide capture defaults once at startup (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{LaunchConfig, RawLaunchConfig};
pub use settings::{CaptureSettings, DEFAULT_CAPTURE_LIMIT, parse_size};
