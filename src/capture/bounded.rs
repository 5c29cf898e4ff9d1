// src/capture/bounded.rs

use std::io;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::capture::mirror::{LogMirror, TracingMirror};
use crate::config::CaptureSettings;
use crate::exec::sink::{OutputSink, lock};

/// Append-only byte buffer with a hard capacity.
///
/// Writes past the capacity are truncated, never rejected: a full sink keeps
/// accepting calls and ignores their bytes. This keeps a chatty child from
/// exhausting memory at the cost of losing the tail of its output.
///
/// When a [`LogMirror`] is attached, the accepted part of every write is also
/// handed to it as text, inside the same critical section as the append.
/// Bytes that were dropped for lack of room are never mirrored. A UTF-8
/// character split across writes is held back until it is complete, so the
/// concatenated mirror text decodes exactly the accepted bytes. Whatever is
/// still held back is flushed when the sink fills up or is closed.
#[derive(Debug)]
pub struct BoundedCaptureSink {
    capacity: usize,
    state: Mutex<State>,
    mirror: Option<Arc<dyn LogMirror>>,
}

#[derive(Debug, Default)]
struct State {
    buffer: Vec<u8>,
    /// Trailing bytes of an incomplete UTF-8 character, not yet mirrored.
    pending: Vec<u8>,
}

impl BoundedCaptureSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(State::default()),
            mirror: None,
        }
    }

    /// Sink sized by the process-wide default limit.
    pub fn from_settings(settings: &CaptureSettings) -> Self {
        Self::new(settings.default_limit)
    }

    /// Sink that also logs what it accepts through [`TracingMirror`].
    pub fn mirrored(capacity: usize, label: impl Into<String>) -> Self {
        Self::with_mirror(capacity, Arc::new(TracingMirror::new(label)))
    }

    pub fn with_mirror(capacity: usize, mirror: Arc<dyn LogMirror>) -> Self {
        Self {
            capacity,
            state: Mutex::new(State::default()),
            mirror: Some(mirror),
        }
    }

    /// Append as much of `bytes` as fits. Returns how many bytes were kept.
    pub fn write(&self, bytes: &[u8]) -> usize {
        let mut guard = lock(&self.state);
        let state = &mut *guard;

        let room = self.capacity.saturating_sub(state.buffer.len());
        let accepted = &bytes[..bytes.len().min(room)];

        if accepted.len() < bytes.len() {
            debug!(
                capacity = self.capacity,
                dropped = bytes.len() - accepted.len(),
                "capture buffer full; dropping bytes"
            );
        }

        if accepted.is_empty() {
            return 0;
        }

        state.buffer.extend_from_slice(accepted);

        if let Some(mirror) = &self.mirror {
            state.pending.extend_from_slice(accepted);
            let full = state.buffer.len() >= self.capacity;
            let hold = if full { 0 } else { incomplete_tail_len(&state.pending) };
            let cut = state.pending.len() - hold;
            let rest = state.pending.split_off(cut);
            let text = std::mem::replace(&mut state.pending, rest);
            if !text.is_empty() {
                mirror.mirror(&String::from_utf8_lossy(&text));
            }
        }

        accepted.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        lock(&self.state).buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Copy of everything captured so far.
    pub fn contents(&self) -> Vec<u8> {
        lock(&self.state).buffer.clone()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&lock(&self.state).buffer).into_owned()
    }
}

impl OutputSink for BoundedCaptureSink {
    fn write_chunk(&self, chunk: &[u8]) -> io::Result<()> {
        self.write(chunk);
        Ok(())
    }

    /// Mirror any held-back partial character as is.
    fn close(&self) -> io::Result<()> {
        let Some(mirror) = &self.mirror else {
            return Ok(());
        };
        let pending = std::mem::take(&mut lock(&self.state).pending);
        if !pending.is_empty() {
            mirror.mirror(&String::from_utf8_lossy(&pending));
        }
        Ok(())
    }
}

/// Length of the trailing bytes that start a UTF-8 character but do not
/// finish it. Invalid sequences earlier in `bytes` are left to lossy decoding.
fn incomplete_tail_len(bytes: &[u8]) -> usize {
    match std::str::from_utf8(bytes) {
        Ok(_) => 0,
        Err(e) => match e.error_len() {
            None => bytes.len() - e.valid_up_to(),
            Some(bad) => incomplete_tail_len(&bytes[e.valid_up_to() + bad..]),
        },
    }
}
