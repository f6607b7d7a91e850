//! # nplay Telemetry
//!
//! Logging setup and Prometheus counters for the replay pipeline.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
