// src/exec/pump.rs

//! Background byte pumps from a child's output pipes into a sink.
//!
//! A [`StreamPump`] copies chunks from one `AsyncRead` into an optional
//! [`SharedSink`] until the source hits EOF, a read or write fails, or the
//! pump is cancelled. Whatever the reason, the source is dropped and the sink
//! is closed before the pump finishes. Errors are logged and reported in the
//! [`PumpReport`], never propagated: by the time a pump fails the launch has
//! already succeeded.
//!
//! Pumps run as Tokio tasks, so they never hold the runtime open on shutdown.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::exec::sink::SharedSink;

pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// Why a pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    Eof,
    ReadFailed(String),
    WriteFailed(String),
    Cancelled,
}

/// Summary of one pump run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpReport {
    pub stream: String,
    /// Bytes read from the source (also written, unless a write failed).
    pub bytes: u64,
    pub exit: PumpExit,
}

pub struct StreamPump<R> {
    stream: String,
    source: R,
    destination: Option<SharedSink>,
    chunk_size: usize,
}

enum Step {
    Read(std::io::Result<usize>),
    Cancelled,
    CancelDetached,
}

impl<R> StreamPump<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// `stream` names the pump in logs and reports (`"stdout"`, `"stderr"`).
    /// A `None` destination drains and discards.
    pub fn new(stream: impl Into<String>, source: R, destination: Option<SharedSink>) -> Self {
        Self {
            stream: stream.into(),
            source,
            destination,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Run the pump on a fresh Tokio task.
    pub fn spawn(self) -> PumpHandle {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let stream = self.stream.clone();
        let handle = tokio::spawn(self.run(Some(cancel_rx)));

        PumpHandle {
            stream,
            cancel: Some(cancel_tx),
            handle,
        }
    }

    /// Pump until EOF, error, or a cancel signal.
    ///
    /// A dropped cancel sender is not a cancellation; the pump just stops
    /// listening for one.
    pub async fn run(self, cancel: Option<oneshot::Receiver<()>>) -> PumpReport {
        let StreamPump {
            stream,
            mut source,
            destination,
            chunk_size,
        } = self;
        let mut cancel = cancel;
        let mut buf = vec![0u8; chunk_size];
        let mut bytes: u64 = 0;

        debug!(stream = %stream, discard = destination.is_none(), "pump started");

        let exit = loop {
            let step = match cancel.as_mut() {
                Some(rx) => tokio::select! {
                    biased;
                    signal = rx => match signal {
                        Ok(()) => Step::Cancelled,
                        Err(_) => Step::CancelDetached,
                    },
                    read = source.read(&mut buf) => Step::Read(read),
                },
                None => Step::Read(source.read(&mut buf).await),
            };

            match step {
                Step::Cancelled => break PumpExit::Cancelled,
                Step::CancelDetached => {
                    cancel = None;
                }
                Step::Read(Ok(0)) => break PumpExit::Eof,
                Step::Read(Ok(n)) => {
                    bytes += n as u64;
                    if let Some(dest) = &destination {
                        if let Err(e) = dest.write_chunk(&buf[..n]) {
                            break PumpExit::WriteFailed(e.to_string());
                        }
                    }
                }
                Step::Read(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Step::Read(Err(e)) => break PumpExit::ReadFailed(e.to_string()),
            }
        };

        drop(source);
        if let Some(dest) = destination {
            if let Err(e) = dest.close() {
                debug!(stream = %stream, error = %e, "ignoring sink close failure");
            }
        }

        match &exit {
            PumpExit::ReadFailed(e) | PumpExit::WriteFailed(e) => {
                warn!(stream = %stream, bytes, error = %e, "pump stopped on error");
            }
            PumpExit::Cancelled => debug!(stream = %stream, bytes, "pump cancelled"),
            PumpExit::Eof => debug!(stream = %stream, bytes, "pump reached end of stream"),
        }

        PumpReport {
            stream,
            bytes,
            exit,
        }
    }
}

/// Handle to a running pump.
///
/// Dropping the handle leaves the pump running in the background.
#[derive(Debug)]
pub struct PumpHandle {
    stream: String,
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<PumpReport>,
}

impl PumpHandle {
    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Ask the pump to stop at its next chunk boundary.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            if cancel.send(()).is_err() {
                debug!(stream = %self.stream, "pump already finished while cancelling");
            }
        }
    }

    /// Wait for the pump to finish. `None` if its task panicked or was aborted.
    pub async fn join(self) -> Option<PumpReport> {
        // Keep the cancel sender alive until the pump is done so that joining
        // never reads as a cancellation.
        let _cancel = self.cancel;
        match self.handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(stream = %self.stream, error = %e, "pump task did not complete");
                None
            }
        }
    }
}

/// The stdout/stderr pumps of one launch.
#[derive(Debug, Default)]
pub struct PumpGroup {
    handles: Vec<PumpHandle>,
}

impl PumpGroup {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    pub fn push(&mut self, handle: PumpHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(PumpHandle::is_finished)
    }

    pub fn cancel_all(&mut self) {
        for handle in &mut self.handles {
            handle.cancel();
        }
    }

    /// Wait for every pump, in start order.
    pub async fn join_all(self) -> Vec<PumpReport> {
        let mut reports = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            if let Some(report) = handle.join().await {
                reports.push(report);
            }
        }
        reports
    }
}
