// src/exec/sink.rs

//! Output destinations shared by the stdout and stderr pumps.
//!
//! Both pumps of a launch write into the *same* sink, so every sink takes
//! `&self` and does its own locking. A sink is handed around as a
//! [`SharedSink`]; "closing" it from a pump flushes it and drops that pump's
//! reference, the underlying resource goes away with the last reference.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// A destination that accepts chunks from several writers at once.
pub trait OutputSink: Send + Sync + fmt::Debug {
    /// Append one chunk. Implementations decide whether overflow is an error.
    fn write_chunk(&self, chunk: &[u8]) -> io::Result<()>;

    /// Called by each pump when it stops.
    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}

pub type SharedSink = Arc<dyn OutputSink>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A writer that panicked mid-chunk leaves at worst a torn chunk behind.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Output file created by the resolver.
///
/// Writes are blocking `std::fs` calls made from the pump tasks. They go
/// through a `BufWriter`, so most chunks only touch memory; a child producing
/// output faster than the disk absorbs it stalls a runtime worker for the
/// length of one flush.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, file: File) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(BufWriter::new(file)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink for FileSink {
    fn write_chunk(&self, chunk: &[u8]) -> io::Result<()> {
        lock(&self.writer).write_all(chunk)
    }

    fn close(&self) -> io::Result<()> {
        lock(&self.writer).flush()
    }
}

/// Adapter turning any `Write` (stdout, a `Vec<u8>`, a socket) into a sink.
pub struct WriterSink<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W> fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink").finish_non_exhaustive()
    }
}

impl<W: Write + Send> OutputSink for WriterSink<W> {
    fn write_chunk(&self, chunk: &[u8]) -> io::Result<()> {
        lock(&self.inner).write_all(chunk)
    }

    fn close(&self) -> io::Result<()> {
        lock(&self.inner).flush()
    }
}
