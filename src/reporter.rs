//! Periodic throughput reporting.
//!
//! Mirrors the operator-facing heartbeat of the collector: every
//! report interval, log how many bytes the sink has accumulated in
//! total and how many arrived since the previous report. The
//! reporter only ever reads the shared counters; ingestion never
//! waits for it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::info;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::metrics::CollectorMetrics;

/// One row of the periodic report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputSample {
    pub total_bytes: u64,
    pub delta_bytes: u64,
    pub records: u64,
}

/// Tracks the byte count between reports.
///
/// The baseline starts at zero, so the first report shows
/// everything written since startup as its delta.
pub struct ThroughputReporter {
    metrics: Arc<CollectorMetrics>,
    last_bytes: u64,
}

impl ThroughputReporter {
    pub fn new(metrics: Arc<CollectorMetrics>) -> Self {
        Self {
            metrics,
            last_bytes: 0,
        }
    }

    /// Reads the counters and advances the baseline.
    pub fn sample(&mut self) -> ThroughputSample {
        let snapshot = self.metrics.snapshot();
        let total_bytes = snapshot.bytes_written;
        let delta_bytes = total_bytes.saturating_sub(self.last_bytes);
        self.last_bytes = total_bytes;

        ThroughputSample {
            total_bytes,
            delta_bytes,
            records: snapshot.records_written,
        }
    }

    /// Report loop. Sleeps for `period`, logs one sample, repeats
    /// until shutdown is signalled.
    pub async fn run(mut self, period: Duration, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                _ = sleep(period) => {
                    let sample = self.sample();
                    info!(
                        "[METRICS] bytes_total={} bytes_delta={} records={} at={}",
                        sample.total_bytes,
                        sample.delta_bytes,
                        sample.records,
                        Utc::now().to_rfc3339(),
                    );
                }
                _ = shutdown.recv() => {
                    return;
                }
            }
        }
    }
}
