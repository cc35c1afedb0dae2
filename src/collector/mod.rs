//! Collector module
//!
//! This module groups all logic responsible for:
//! - Keeping one WebSocket session open against the ticker feed
//! - Turning inbound ticker frames into appended records
//! - Reconnecting whenever a session ends
//!
//! Design notes:
//! - `runner` supervises; `session` handles exactly one connection
//! - Frame decoding lives in `schema`, persistence in `sink`;
//!   neither belongs here
//! - The endpoint is a parameter everywhere below this constant,
//!   so tests can point a collector at a local mock feed

pub mod runner;
pub mod session;

/// Production feed endpoint.
pub const COINBASE_FEED_URL: &str = "wss://ws-feed.exchange.coinbase.com";
