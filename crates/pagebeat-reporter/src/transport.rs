//! Batch transports.
//!
//! A transport receives batches and provides no feedback channel: delivery
//! is best-effort, there is no retry, and failures stay inside the
//! transport (logged at most). `BeaconTransport` (see `beacon`) is the
//! production implementation; the ones here log, append to a file, or
//! record in memory for tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use pagebeat_types::Envelope;

/// Fire-and-forget batch delivery.
pub trait Transport: Send + Sync {
    /// Hand over one batch. Must not block on network completion and must
    /// not panic on delivery problems.
    fn send(&self, batch: &[Envelope]);
}

/// Logs each envelope via `tracing`.
pub struct LogTransport;

impl Transport for LogTransport {
    fn send(&self, batch: &[Envelope]) {
        for envelope in batch {
            tracing::info!(
                code = %envelope.head.code,
                time = envelope.head.time,
                sid = %envelope.head.sid,
                "event"
            );
        }
    }
}

/// Appends each batch as one JSON-array line.
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, batch: &[Envelope]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let json = serde_json::to_string(batch)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(file, "{}", json)
    }
}

impl Transport for FileTransport {
    fn send(&self, batch: &[Envelope]) {
        if let Err(e) = self.append(batch) {
            tracing::error!(path = %self.path.display(), error = %e, "failed to append batch");
        }
    }
}

/// Captures batches in memory for inspection.
#[derive(Default)]
pub struct RecordingTransport {
    batches: Mutex<Vec<Vec<Envelope>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all recorded batches, leaving the transport empty.
    pub fn take_batches(&self) -> Vec<Vec<Envelope>> {
        std::mem::take(&mut *self.batches.lock())
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn envelope_count(&self) -> usize {
        self.batches.lock().iter().map(Vec::len).sum()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, batch: &[Envelope]) {
        self.batches.lock().push(batch.to_vec());
    }
}
