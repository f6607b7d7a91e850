//! ## nplay-engine::pipeline
//! The single-consumer packet pipeline:
//! extract (classify) → schedule → encode → send, one record at a time.
//!
//! Per-packet failures are logged with the record summary and counted; they
//! never stop the loop. Only a capture read error or a stop request ends
//! [`Pipeline::run`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, warn};

use nplay_capture::{CaptureError, PacketSource};
use nplay_config::RuntimeSettings;
use nplay_core::prelude::*;
use nplay_protocols::PacketEncoder;
use nplay_telemetry::MetricsRecorder;

use crate::error::PacketError;
use crate::pacing::Pacer;
use crate::transmit::Transmitter;

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Records pulled from the source.
    pub received: u64,
    /// Records delivered without error.
    pub emitted: u64,
    /// Records dropped by extraction or encoding.
    pub skipped: u64,
    pub datagrams_sent: u64,
    pub send_failures: u64,
}

pub struct Pipeline<T: Transmitter> {
    extractor: FieldExtractor,
    scheduler: Scheduler,
    encoder: PacketEncoder,
    transmitter: T,
    bundle_timing: bool,
    pacer: Option<Pacer>,
    metrics: MetricsRecorder,
    stats: RunStats,
}

impl<T: Transmitter> Pipeline<T> {
    pub fn new(
        extractor: FieldExtractor,
        scheduler: Scheduler,
        encoder: PacketEncoder,
        transmitter: T,
        metrics: MetricsRecorder,
    ) -> Self {
        Pipeline {
            extractor,
            scheduler,
            encoder,
            transmitter,
            bundle_timing: true,
            pacer: None,
            metrics,
            stats: RunStats::default(),
        }
    }

    /// Builds the pipeline described by `settings`, with the scheduler's
    /// process start taken now.
    pub fn from_settings(settings: &RuntimeSettings, transmitter: T, metrics: MetricsRecorder) -> Self {
        let extractor = FieldExtractor::new(DirectionClassifier::new(settings.local_addr));
        let scheduler = Scheduler::new(settings.time_warp, settings.guard_interval);
        let encoder = PacketEncoder::new(
            settings.encoding.address_format,
            settings.encoding.max_string_len,
            settings.encoding.triggers,
        );
        let mut pipeline = Pipeline::new(extractor, scheduler, encoder, transmitter, metrics)
            .with_bundle_timing(settings.bundle_timing);
        if settings.realtime_pacing {
            pipeline = pipeline.with_pacer(Pacer::new(settings.time_warp));
        }
        pipeline
    }

    /// Bundles with delivery time-tags (`true`) or bare messages.
    pub fn with_bundle_timing(mut self, bundle_timing: bool) -> Self {
        self.bundle_timing = bundle_timing;
        self
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    /// Extract, schedule and encode one record.
    fn prepare(&mut self, record: &PacketRecord) -> Result<(CanonicalEvent, Vec<Bytes>), PacketError> {
        let event = self.extractor.extract(record)?;
        let delivery = self.scheduler.schedule(&event);
        let datagrams = if self.bundle_timing {
            vec![self.encoder.encode(&event, delivery)?]
        } else {
            self.encoder.encode_unbundled(&event)?
        };
        debug!(
            direction = %event.direction,
            delivery,
            sequence = self.scheduler.sequence(),
            "{event}"
        );
        Ok((event, datagrams))
    }

    /// Sends every datagram for one event; reports the first failure.
    fn send_all(&mut self, datagrams: &[Bytes]) -> Result<(), PacketError> {
        let mut first_error = None;
        for datagram in datagrams {
            match self.transmitter.send(datagram) {
                Ok(()) => {
                    self.stats.datagrams_sent += 1;
                    self.metrics.inc_sent();
                }
                Err(e) => {
                    self.stats.send_failures += 1;
                    self.metrics.inc_send_failures();
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Processes one record end to end. The error, if any, concerns this
    /// record only.
    pub fn process(&mut self, record: &PacketRecord, terminate: &AtomicBool) -> Result<(), PacketError> {
        let started = Instant::now();
        let (event, datagrams) = self.prepare(record)?;
        self.metrics
            .observe_encode_latency(started.elapsed().as_nanos() as f64);

        if let Some(pacer) = &self.pacer {
            // Interrupted: still send, the loop stops before the next record.
            pacer.wait(event.timestamp, terminate);
        }
        let result = self.send_all(&datagrams);
        if let Some(pacer) = &mut self.pacer {
            pacer.mark_sent(event.timestamp, Instant::now());
        }
        result
    }

    /// [`process`](Self::process) plus accounting and diagnostics.
    pub fn handle(&mut self, record: &PacketRecord, terminate: &AtomicBool) {
        self.stats.received += 1;
        self.metrics.inc_packets();
        match self.process(record, terminate) {
            Ok(()) => self.stats.emitted += 1,
            Err(e @ PacketError::Transport(_)) => {
                warn!(error = %e, "Send failed, continuing");
            }
            Err(e) => {
                self.stats.skipped += 1;
                self.metrics.inc_skipped(e.reason());
                warn!(error = %e, record = ?record, "Skipping packet");
            }
        }
    }

    /// Consumes `source` until it is exhausted or `terminate` is raised.
    pub fn run<S: PacketSource + ?Sized>(
        &mut self,
        source: &mut S,
        terminate: &AtomicBool,
    ) -> Result<RunStats, CaptureError> {
        while !terminate.load(Ordering::Relaxed) {
            match source.next_record()? {
                Some(record) => self.handle(&record, terminate),
                None => break,
            }
        }
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use nplay_capture::MemorySource;
    use nplay_protocols::osc::{decode, OscArg, OscPacket, TimeTag};
    use nplay_protocols::AddressFormat;
    use std::io;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<Vec<u8>>,
        fail: bool,
    }

    impl Transmitter for Recorder {
        fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError {
                    target: ([127, 0, 0, 1], 9).into(),
                    len: datagram.len(),
                    source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
                });
            }
            self.sent.push(datagram.to_vec());
            Ok(())
        }
    }

    const START: f64 = 1_000_000.0;

    fn pipeline(recorder: Recorder, local: Option<&str>) -> Pipeline<Recorder> {
        Pipeline::new(
            FieldExtractor::new(DirectionClassifier::new(local.map(|a| a.parse().unwrap()))),
            Scheduler::with_start(START, TimeWarp::default(), 20.0),
            PacketEncoder::default(),
            recorder,
            MetricsRecorder::new().unwrap(),
        )
    }

    fn http_record(ts: f64) -> PacketRecord {
        PacketRecord::new(ts, 120, "HTTP")
            .with_network("192.168.1.10".parse().unwrap(), "93.184.216.34".parse().unwrap())
            .with_transport("TCP")
            .with_tcp(51000, 80)
    }

    fn bundle(bytes: &[u8]) -> (TimeTag, Vec<OscArg>) {
        match decode(bytes).unwrap() {
            OscPacket::Bundle(b) => match &b.elements[0] {
                OscPacket::Message(m) => (b.timetag, m.args().to_vec()),
                other => panic!("expected message, got {other:?}"),
            },
            other => panic!("expected bundle, got {other:?}"),
        }
    }

    #[test]
    fn outgoing_http_packet() {
        let mut p = pipeline(Recorder::default(), None);
        let stop = AtomicBool::new(false);
        p.handle(&http_record(500.0), &stop);

        assert_eq!(p.stats().emitted, 1);
        let (timetag, args) = bundle(&p.transmitter().sent[0]);
        assert_eq!(timetag, TimeTag::from_unix_secs(START + 20.0));
        assert_eq!(args[0], OscArg::Int(0));
        assert_eq!(args[2], OscArg::Int(51000));
        assert_eq!(args[3], OscArg::Int(80));
        assert_eq!(args[4], OscArg::Str("HTTP".into()));
        assert_eq!(args[8], OscArg::Str("93.184.216.34".into()));
    }

    #[traced_test]
    #[test]
    fn bad_record_is_skipped_and_logged() {
        let mut p = pipeline(Recorder::default(), None);
        let mut source = MemorySource::new(vec![
            http_record(1.0),
            PacketRecord::new(2.0, 42, "ARP"),
            http_record(3.0),
        ]);
        let stats = p.run(&mut source, &AtomicBool::new(false)).unwrap();

        assert_eq!(stats.received, 3);
        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(p.transmitter().sent.len(), 2);
        assert!(logs_contain("Skipping packet"));
        assert!(logs_contain("ARP"));
    }

    #[test]
    fn delivery_times_follow_source_order() {
        let mut p = pipeline(Recorder::default(), None);
        let mut source = MemorySource::new((0..5).map(|i| http_record(100.0 + i as f64 * 0.5)));
        p.run(&mut source, &AtomicBool::new(false)).unwrap();

        let tags: Vec<TimeTag> = p
            .transmitter()
            .sent
            .iter()
            .map(|d| bundle(d).0)
            .collect();
        assert_eq!(tags.len(), 5);
        assert!(tags.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tags[4], TimeTag::from_unix_secs(START + 2.0 + 100.0));
    }

    #[test]
    fn send_failure_does_not_stop_the_run() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut p = pipeline(recorder, None);
        let mut source = MemorySource::new(vec![http_record(1.0), http_record(2.0)]);
        let stats = p.run(&mut source, &AtomicBool::new(false)).unwrap();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.send_failures, 2);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.emitted, 0);
    }

    #[test]
    fn oversized_field_is_an_encoding_skip() {
        let mut p = pipeline(Recorder::default(), None);
        let record = PacketRecord::new(1.0, 60, "X".repeat(4096))
            .with_network("10.0.0.1".parse().unwrap(), "10.0.0.2".parse().unwrap());
        let err = p.process(&record, &AtomicBool::new(false)).unwrap_err();
        assert_eq!(err.reason(), "encoding");
        assert!(p.transmitter().sent.is_empty());
    }

    #[test]
    fn message_mode_sends_bare_messages_with_triggers() {
        let mut p = pipeline(Recorder::default(), Some("192.168.1.10")).with_bundle_timing(false);
        p.encoder = PacketEncoder::new(AddressFormat::HighOctet, 1024, true);
        let record = http_record(1.0).with_tcp_flags(TcpFlags {
            syn: true,
            ..Default::default()
        });
        p.handle(&record, &AtomicBool::new(false));

        let addresses: Vec<String> = p
            .transmitter()
            .sent
            .iter()
            .map(|d| match decode(d).unwrap() {
                OscPacket::Message(m) => m.address().to_string(),
                other => panic!("expected message, got {other:?}"),
            })
            .collect();
        assert_eq!(addresses, ["/gotpacket", "/type/tcp_syn", "/type/outgoing"]);
    }

    #[test]
    fn stop_flag_ends_before_next_record() {
        let mut p = pipeline(Recorder::default(), None);
        let mut source = MemorySource::new(vec![http_record(1.0), http_record(2.0)]);
        let stats = p.run(&mut source, &AtomicBool::new(true)).unwrap();
        assert_eq!(stats.received, 0);
        assert_eq!(source.remaining(), 2);
    }
}
