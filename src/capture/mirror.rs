// src/capture/mirror.rs

use std::fmt;

use tracing::info;

/// Side channel receiving every chunk a capture sink accepts, as text.
pub trait LogMirror: Send + Sync + fmt::Debug {
    fn mirror(&self, text: &str);
}

/// Mirror that emits each chunk as an `INFO` event on `proclaunch::capture`.
#[derive(Debug, Clone)]
pub struct TracingMirror {
    label: String,
}

impl TracingMirror {
    /// `label` is attached to every event, usually the launch title.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl LogMirror for TracingMirror {
    fn mirror(&self, text: &str) {
        info!(target: "proclaunch::capture", label = %self.label, "{}", text.trim_end());
    }
}
