use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Runtime counters for the collector.
///
/// Purpose:
/// - Track session lifecycle (opens, reconnects)
/// - Track throughput (frames in, records and bytes out)
/// - Track locally recovered failures (parse, write)
///
/// Design:
/// - Lock-free (relaxed atomics)
/// - Single logical writer: the ingestion path
/// - The reporter reads through `snapshot()` / `bytes_written()`
///   and never mutates
///
/// The instance is owned by the wiring layer and shared by `Arc`,
/// so its lifetime is explicit instead of process-global.
#[derive(Debug, Default)]
pub struct CollectorMetrics {
    sessions_opened: AtomicU64,
    reconnects: AtomicU64,

    frames_received: AtomicU64,
    frames_filtered: AtomicU64,

    records_written: AtomicU64,
    bytes_written: AtomicU64,

    parse_errors: AtomicU64,
    write_errors: AtomicU64,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sessions_opened: u64,
    pub reconnects: u64,
    pub frames_received: u64,
    pub frames_filtered: u64,
    pub records_written: u64,
    pub bytes_written: u64,
    pub parse_errors: u64,
    pub write_errors: u64,
}

impl CollectorMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // --------------------------------------------------------
    // Writers (ingestion path only)
    // --------------------------------------------------------

    pub fn session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_filtered(&self) {
        self.frames_filtered.fetch_add(1, Ordering::Relaxed);
    }

    /// Accounts one appended record and its byte length.
    ///
    /// Called after the sink accepted the line, so the byte counter
    /// only ever covers lines actually handed to the file.
    pub fn record_appended(&self, bytes: u64) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    // --------------------------------------------------------
    // Readers
    // --------------------------------------------------------

    /// Cumulative bytes handed to the sink.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Copies all counters.
    ///
    /// Counters are read one by one, so a snapshot taken mid-update
    /// may lag by an in-flight record. That staleness is accepted;
    /// reading must never slow the ingestion path down.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_filtered: self.frames_filtered.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}
