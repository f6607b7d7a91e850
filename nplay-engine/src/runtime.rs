/*!
# Runtime

Entry points that wire a capture source, the pipeline and the UDP
transmitter together for one run. The pipeline is blocking (libpcap reads
block), so it runs on a blocking task while the async side waits for
Ctrl-C.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use opentelemetry::KeyValue;
use tracing::{debug, info, instrument, warn, Span};

use nplay_capture::{LiveOptions, LiveSource, PacketSource, TraceSource};
use nplay_config::{CaptureSource, RuntimeSettings};
use nplay_telemetry::{EventLogger, MetricsRecorder};

use crate::error::EngineError;
use crate::pipeline::{Pipeline, RunStats};
use crate::transmit::UdpTransmitter;

/// Runs until the source is exhausted or Ctrl-C is pressed.
#[instrument(level = "info", name = "run_pipeline", skip(settings), fields(osc_server = %settings.target))]
pub async fn run(settings: RuntimeSettings) -> Result<RunStats, EngineError> {
    let metrics = MetricsRecorder::new().map_err(|e| EngineError::Metrics(e.to_string()))?;
    let terminate = Arc::new(AtomicBool::new(false));

    let signal_flag = terminate.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current packet");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let span = Span::current();
    let worker_flag = terminate.clone();
    let result = tokio::task::spawn_blocking(move || {
        span.in_scope(|| run_blocking(&settings, metrics, worker_flag))
    })
    .await;
    signal_task.abort();
    result?
}

fn open_source(
    source: &CaptureSource,
    terminate: &Arc<AtomicBool>,
) -> Result<Box<dyn PacketSource>, EngineError> {
    let opened: Box<dyn PacketSource> = match source {
        CaptureSource::Trace(path) => Box::new(TraceSource::open(path)?),
        CaptureSource::Live {
            interface,
            promiscuous,
            snaplen,
            timeout_ms,
        } => Box::new(LiveSource::open(
            interface,
            LiveOptions {
                promiscuous: *promiscuous,
                snaplen: *snaplen,
                timeout_ms: *timeout_ms,
            },
            terminate.clone(),
        )?),
    };
    Ok(opened)
}

/// Synchronous body of [`run`]: opens the transmitter and source, consumes
/// the source and logs the run summary.
pub fn run_blocking(
    settings: &RuntimeSettings,
    metrics: MetricsRecorder,
    terminate: Arc<AtomicBool>,
) -> Result<RunStats, EngineError> {
    let transmitter = UdpTransmitter::connect(&settings.target)?;
    let mut source = open_source(&settings.source, &terminate)?;
    info!(
        source = %source.describe(),
        osc_server = %transmitter.target(),
        bundle_timing = settings.bundle_timing,
        time_warp = settings.time_warp.get(),
        "Pipeline starting"
    );

    let started = Instant::now();
    let mut pipeline = Pipeline::from_settings(settings, transmitter, metrics.clone());
    let stats = pipeline.run(&mut source, &terminate)?;

    let kind = if terminate.load(Ordering::Relaxed) {
        "capture_stopped"
    } else {
        "replay_complete"
    };
    EventLogger::log_event(
        kind,
        vec![
            KeyValue::new("source", source.describe()),
            KeyValue::new("received", stats.received as i64),
            KeyValue::new("emitted", stats.emitted as i64),
            KeyValue::new("skipped", stats.skipped as i64),
            KeyValue::new("datagrams_sent", stats.datagrams_sent as i64),
            KeyValue::new("send_failures", stats.send_failures as i64),
            KeyValue::new("elapsed_ms", started.elapsed().as_millis() as i64),
        ],
    );
    match metrics.gather_metrics() {
        Ok(text) => debug!("Final metrics:\n{text}"),
        Err(e) => warn!(error = %e, "Failed to render metrics"),
    }
    Ok(stats)
}
