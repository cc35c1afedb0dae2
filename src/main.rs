// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// This is the main runtime for the Coinbase ticker collector.
//
// Responsibilities:
// - Initialize cryptography backend (rustls)
// - Initialize logging
// - Load configuration
// - Open the output file
// - Start the periodic throughput reporter
// - Run the collector loop until Ctrl-C
//

use std::sync::Arc;

use rustls::crypto::{CryptoProvider, ring};

use anyhow::Context;
use env_logger::Env;
use log::{error, info};
use tokio::sync::broadcast;

use coinbase_ticker_collector::collector::COINBASE_FEED_URL;
use coinbase_ticker_collector::collector::runner::run_collector;
use coinbase_ticker_collector::config::CollectorConfig;
use coinbase_ticker_collector::metrics::CollectorMetrics;
use coinbase_ticker_collector::reporter::ThroughputReporter;
use coinbase_ticker_collector::sink::RecordSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --------------------------------------------------------
    // IMPORTANT:
    // rustls >= 0.23 requires an explicit CryptoProvider
    // installation. This must be executed exactly once and
    // as early as possible in the process lifecycle.
    //
    // Using the `ring` provider for performance and stability.
    // --------------------------------------------------------
    CryptoProvider::install_default(ring::default_provider())
        .expect("failed to install rustls CryptoProvider");

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cfg = CollectorConfig::load_or_default("config.json")?;

    // The output file must be writable before anything connects;
    // a collector with nowhere to write is useless.
    let mut sink = RecordSink::open(&cfg.output_path)
        .await
        .context("failed to open the output file")?;

    let metrics = CollectorMetrics::new();

    // One shutdown broadcast fans out to the collector loop and
    // the reporter.
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn({
        let shutdown_tx = shutdown_tx.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("cannot listen for ctrl-c: {e}");
                return;
            }
            info!("ctrl-c received, shutting down");
            let _ = shutdown_tx.send(());
        }
    });

    tokio::spawn(
        ThroughputReporter::new(Arc::clone(&metrics))
            .run(cfg.report_interval(), shutdown_tx.subscribe()),
    );

    run_collector(COINBASE_FEED_URL, &cfg, &mut sink, &metrics, shutdown_rx).await?;

    // Push whatever is still buffered out to disk before exiting.
    sink.flush().await.context("final flush failed")?;

    let snapshot = metrics.snapshot();
    info!(
        "collector stopped: sessions={} records={} bytes={}",
        snapshot.sessions_opened, snapshot.records_written, snapshot.bytes_written
    );

    Ok(())
}
