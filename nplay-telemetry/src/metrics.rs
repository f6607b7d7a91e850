//! ## nplay-telemetry::metrics
//! Prometheus counters for the packet pipeline.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub packets: IntCounter,
    pub skipped: IntCounterVec,
    pub datagrams_sent: IntCounter,
    pub send_failures: IntCounter,
    pub encode_latency: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let packets = IntCounter::new("nplay_packets_total", "Packet records consumed")?;
        let skipped = IntCounterVec::new(
            Opts::new("nplay_packets_skipped_total", "Packets skipped, by reason"),
            &["reason"],
        )?;
        let datagrams_sent =
            IntCounter::new("nplay_datagrams_sent_total", "OSC datagrams handed to the socket")?;
        let send_failures =
            IntCounter::new("nplay_send_failures_total", "OSC datagrams the socket rejected")?;
        let encode_latency = Histogram::with_opts(
            HistogramOpts::new(
                "nplay_encode_latency_ns",
                "Extract + schedule + encode time per packet",
            )
            .buckets(vec![1_000.0, 10_000.0, 100_000.0, 1_000_000.0]),
        )?;

        registry.register(Box::new(packets.clone()))?;
        registry.register(Box::new(skipped.clone()))?;
        registry.register(Box::new(datagrams_sent.clone()))?;
        registry.register(Box::new(send_failures.clone()))?;
        registry.register(Box::new(encode_latency.clone()))?;

        Ok(Self {
            registry,
            packets,
            skipped,
            datagrams_sent,
            send_failures,
            encode_latency,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn inc_packets(&self) {
        self.packets.inc();
    }

    pub fn inc_skipped(&self, reason: &str) {
        self.skipped.with_label_values(&[reason]).inc();
    }

    pub fn inc_sent(&self) {
        self.datagrams_sent.inc();
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.inc();
    }

    pub fn observe_encode_latency(&self, nanos: f64) {
        self.encode_latency.observe(nanos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.inc_packets();
        metrics.inc_packets();
        metrics.inc_skipped("extraction");
        metrics.inc_sent();
        metrics.observe_encode_latency(2_500.0);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("nplay_packets_total 2"));
        assert!(text.contains("nplay_packets_skipped_total{reason=\"extraction\"} 1"));
        assert!(text.contains("nplay_datagrams_sent_total 1"));
        assert!(text.contains("nplay_encode_latency_ns_count 1"));
    }
}
