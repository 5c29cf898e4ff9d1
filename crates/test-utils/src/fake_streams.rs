//! Fake sources, sinks and mirrors for pump and capture tests.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use proclaunch::capture::LogMirror;
use proclaunch::exec::OutputSink;
use tokio::io::{AsyncRead, ReadBuf};

/// Counts how many times something was dropped or closed.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A source that yields the given chunks, then EOF (or an error).
pub struct ScriptedReader {
    chunks: VecDeque<Vec<u8>>,
    fail_at_end: bool,
    pending_at_end: bool,
    drops: Counter,
}

impl ScriptedReader {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            fail_at_end: false,
            pending_at_end: false,
            drops: Counter::default(),
        }
    }

    /// A source with nothing to read that never reaches EOF.
    pub fn never_ending() -> Self {
        let mut reader = Self::new(Vec::<Vec<u8>>::new());
        reader.pending_at_end = true;
        reader
    }

    /// Fail with an I/O error instead of reporting EOF.
    pub fn failing_at_end(mut self) -> Self {
        self.fail_at_end = true;
        self
    }

    /// Counter bumped when this reader is dropped.
    pub fn drop_counter(&self) -> Counter {
        self.drops.clone()
    }
}

impl Drop for ScriptedReader {
    fn drop(&mut self) {
        self.drops.bump();
    }
}

impl AsyncRead for ScriptedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if let Some(chunk) = this.chunks.front_mut() {
            let n = chunk.len().min(buf.remaining());
            buf.put_slice(&chunk[..n]);
            chunk.drain(..n);
            if chunk.is_empty() {
                this.chunks.pop_front();
            }
            return Poll::Ready(Ok(()));
        }

        if this.pending_at_end {
            return Poll::Pending;
        }

        if this.fail_at_end {
            return Poll::Ready(Err(io::Error::other("scripted read failure")));
        }

        Poll::Ready(Ok(()))
    }
}

/// Sink that keeps every byte and counts `close` calls.
#[derive(Debug, Default)]
pub struct RecordingSink {
    bytes: Mutex<Vec<u8>>,
    closes: Counter,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.lock().unwrap().clone()
    }

    pub fn close_counter(&self) -> Counter {
        self.closes.clone()
    }
}

impl OutputSink for RecordingSink {
    fn write_chunk(&self, chunk: &[u8]) -> io::Result<()> {
        self.bytes.lock().unwrap().extend_from_slice(chunk);
        Ok(())
    }

    fn close(&self) -> io::Result<()> {
        self.closes.bump();
        Ok(())
    }
}

/// Sink whose writes and closes always fail.
#[derive(Debug, Default)]
pub struct FailingSink {
    closes: Counter,
}

impl FailingSink {
    pub fn close_counter(&self) -> Counter {
        self.closes.clone()
    }
}

impl OutputSink for FailingSink {
    fn write_chunk(&self, _chunk: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink rejected write"))
    }

    fn close(&self) -> io::Result<()> {
        self.closes.bump();
        Err(io::Error::other("sink rejected close"))
    }
}

/// Mirror that records every chunk it is handed.
#[derive(Debug, Default)]
pub struct RecordingMirror {
    chunks: Mutex<Vec<String>>,
}

impl RecordingMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> Vec<String> {
        self.chunks.lock().unwrap().clone()
    }

    pub fn total_bytes(&self) -> usize {
        self.chunks.lock().unwrap().iter().map(String::len).sum()
    }
}

impl LogMirror for RecordingMirror {
    fn mirror(&self, text: &str) {
        self.chunks.lock().unwrap().push(text.to_string());
    }
}
