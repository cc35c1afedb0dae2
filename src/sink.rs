//! Append-only record sink.
//!
//! One growing text file, one record per line. The sink owns the
//! file handle for the whole process lifetime: opened once at
//! startup, released only when the process ends.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Buffered writer over the single output file.
///
/// CONTRACT:
/// - `append` preserves call order exactly; there is one producer,
///   so file order equals ingestion order
/// - appends stay in the write buffer; nothing forces them to disk
///   until `flush` (graceful shutdown) or the buffer fills.
///   Losing the buffered tail on a hard kill is accepted
/// - no rotation, no size cap
pub struct RecordSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl RecordSink {
    /// Opens (or creates) the output file in append mode.
    ///
    /// Failing here means the collector has nowhere to write and
    /// must not start.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open output file {}", path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Appends one record to the file buffer.
    pub async fn append(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .with_context(|| format!("failed to append to {}", self.path.display()))
    }

    /// Pushes buffered records out to the file.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .await
            .with_context(|| format!("failed to flush {}", self.path.display()))
    }

    /// Path of the output file, for diagnostics.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
