// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// Each module represents a well-defined responsibility:
//
// - config:    Options loaded from config.json, built-in defaults
// - schema:    Feed wire types (subscribe request, ticker events)
// - backoff:   Reconnect delay policies
// - metrics:   Shared counters for the ingestion path
// - sink:      Append-only record file
// - reporter:  Periodic throughput report
// - collector: Per-connection session plus reconnect supervisor
//
pub mod backoff;
pub mod collector;
pub mod config;
pub mod metrics;
pub mod reporter;
pub mod schema;
pub mod sink;
