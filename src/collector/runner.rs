use log::{info, warn};
use tokio::sync::broadcast;
use tokio::time::sleep;

use anyhow::Result;

use crate::collector::session::{SessionEnd, run_session};
use crate::config::CollectorConfig;
use crate::metrics::CollectorMetrics;
use crate::schema::SubscribeRequest;
use crate::sink::RecordSink;

/// Keeps one collector connected to the feed for the life of the
/// process.
///
/// This loop:
/// - Runs one session at a time against `url`
/// - Waits out the reconnect delay after every session end
/// - Resends the same subscription on every new session
///
/// GUARANTEES:
/// - Every exit path except shutdown leads back to a reconnect;
///   the loop never gives up on the feed
/// - The sink is owned by this loop for its whole run, so records
///   from consecutive sessions never interleave
///
/// NOT RESPONSIBLE FOR:
/// - Frame handling (session responsibility)
/// - Flushing the sink at shutdown (caller responsibility)
///
pub async fn run_collector(
    url: &str,
    cfg: &CollectorConfig,
    sink: &mut RecordSink,
    metrics: &CollectorMetrics,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let subscribe = SubscribeRequest::ticker(&cfg.instruments);
    let mut policy = cfg.backoff_policy();

    info!(
        "collecting {} instruments into {}",
        cfg.instruments.len(),
        sink.path().display()
    );

    loop {
        match run_session(url, &subscribe, sink, metrics, &mut shutdown).await {
            Ok(SessionEnd::Shutdown) => return Ok(()),

            // The feed was reachable, so the next outage starts a
            // fresh backoff ramp.
            Ok(SessionEnd::Disconnected) => policy.reset(),

            Err(e) => warn!("session failed to start: {e:#}"),
        }

        metrics.reconnect();
        let delay = policy.next_delay();
        info!("reconnecting in {}ms", delay.as_millis());

        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.recv() => return Ok(()),
        }
    }
}
