//! ## nplay-telemetry::logging
//! Structured logging with tracing and OpenTelemetry key/values.

use opentelemetry::KeyValue;
use tracing::info_span;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. `RUST_LOG` takes precedence over `default_level`.
    pub fn init(default_level: &str) -> Result<(), TryInitError> {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_thread_names(true)
            .finish()
            .try_init()
    }

    /// Emits one structured record for a run-level event such as
    /// `replay_complete`.
    #[inline]
    pub fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!("pipeline_event", event_type = event_type, otel.kind = "INTERNAL");
        span.in_scope(|| {
            let fields: Vec<String> = metadata
                .iter()
                .map(|kv| format!("{}={}", kv.key.as_str(), kv.value))
                .collect();
            tracing::info!(metadata = %fields.join(" "), "Pipeline event: {event_type}");
        });
    }
}
