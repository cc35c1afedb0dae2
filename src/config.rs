use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::backoff::BackoffPolicy;

/// Instruments subscribed when no config overrides them.
pub const DEFAULT_INSTRUMENTS: [&str; 5] =
    ["ETH-EUR", "DOGE-EUR", "BCH-EUR", "BTC-EUR", "LTC-EUR"];

/// Delay between a session close and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 1_000;

/// Period of the throughput report.
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 30_000;

/// Output file, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "dataset.csv";

// ------------------------------------------------------------
// Collector configuration
// ------------------------------------------------------------
//
// Loaded from `config.json` when present; every option falls
// back to the constant above, so a partial file (or no file at
// all) is valid.
//
// Option names are camelCase on disk:
//
// {
//   "instruments": ["BTC-EUR"],
//   "reconnectDelayMs": 1000,
//   "reportIntervalMs": 30000,
//   "outputPath": "dataset.csv",
//   "backoff": { "strategy": "exponential", "maxDelayMs": 30000 }
// }
//
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectorConfig {
    /// Instrument identifiers to subscribe, order preserved.
    pub instruments: Vec<String>,

    /// Base delay before reconnecting after a session ends.
    pub reconnect_delay_ms: u64,

    /// Period of the throughput report.
    pub report_interval_ms: u64,

    /// Path of the append-only output file.
    pub output_path: String,

    /// Reconnect delay strategy.
    pub backoff: BackoffSettings,
}

// ------------------------------------------------------------
// Backoff settings
// ------------------------------------------------------------
//
// The default is a fixed delay; exponential growth with a cap is
// available for deployments that see long feed outages and must
// not hammer the endpoint.
//
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum BackoffSettings {
    /// Always wait `reconnectDelayMs`.
    Constant,

    /// Start at `reconnectDelayMs`, double per consecutive
    /// failure, never exceed `maxDelayMs`.
    Exponential {
        #[serde(rename = "maxDelayMs")]
        max_delay_ms: u64,
    },
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            instruments: DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            backoff: BackoffSettings::Constant,
        }
    }
}

impl CollectorConfig {
    /// Loads and validates a configuration file.
    ///
    /// TODO:
    /// - Support CLI override (e.g. --config path)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the built-in
    /// defaults.
    ///
    /// IMPORTANT:
    /// - A *present but invalid* file is an error, never silently
    ///   replaced by defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!(
                "no config file at {}, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Validates option values after deserialization.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.instruments.is_empty(),
            "at least one instrument must be configured"
        );

        for (i, instrument) in self.instruments.iter().enumerate() {
            anyhow::ensure!(
                !instrument.trim().is_empty(),
                "instrument {} is empty",
                i
            );
        }

        anyhow::ensure!(
            self.report_interval_ms > 0,
            "reportIntervalMs must be positive, got {}",
            self.report_interval_ms
        );

        anyhow::ensure!(
            !self.output_path.trim().is_empty(),
            "outputPath must not be empty"
        );

        if let BackoffSettings::Exponential { max_delay_ms } = self.backoff {
            anyhow::ensure!(
                max_delay_ms >= self.reconnect_delay_ms,
                "backoff maxDelayMs ({}) is below reconnectDelayMs ({})",
                max_delay_ms,
                self.reconnect_delay_ms
            );
        }

        Ok(())
    }

    /// Builds the reconnect delay policy selected by this config.
    pub fn backoff_policy(&self) -> BackoffPolicy {
        let base = Duration::from_millis(self.reconnect_delay_ms);

        match self.backoff {
            BackoffSettings::Constant => BackoffPolicy::constant(base),
            BackoffSettings::Exponential { max_delay_ms } => {
                BackoffPolicy::exponential(base, Duration::from_millis(max_delay_ms))
            }
        }
    }

    /// Period of the throughput report as a `Duration`.
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}
