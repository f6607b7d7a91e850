//! End-to-end: a trace file (or in-memory records) through the pipeline to
//! a real UDP socket on loopback.

use std::io::Write;
use std::net::UdpSocket;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use nplay_capture::MemorySource;
use nplay_config::{CaptureSource, NplayConfig, OscTarget};
use nplay_core::PacketRecord;
use nplay_engine::{run_blocking, Pipeline, UdpTransmitter};
use nplay_protocols::osc::{decode, OscArg, OscPacket};
use nplay_telemetry::MetricsRecorder;

fn receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

fn recv_message(socket: &UdpSocket) -> (Option<f64>, Vec<OscArg>) {
    let mut buf = [0u8; 2048];
    let (n, _) = socket.recv_from(&mut buf).unwrap();
    match decode(&buf[..n]).unwrap() {
        OscPacket::Bundle(bundle) => match &bundle.elements[0] {
            OscPacket::Message(m) => (Some(bundle.timetag.to_unix_secs()), m.args().to_vec()),
            other => panic!("expected message, got {other:?}"),
        },
        OscPacket::Message(m) => (None, m.args().to_vec()),
    }
}

fn http_frame() -> Vec<u8> {
    let builder = etherparse::PacketBuilder::ethernet2([2, 0, 0, 0, 0, 1], [2, 0, 0, 0, 0, 2])
        .ipv4([192, 168, 1, 10], [93, 184, 216, 34], 64)
        .tcp(51000, 80, 1, 65535)
        .ack(1);
    let mut buf = Vec::new();
    builder.write(&mut buf, b"GET / HTTP/1.1\r\n\r\n").unwrap();
    buf
}

fn ethernet_trace(frames: &[(u32, u32, Vec<u8>)]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut header = Vec::new();
    header.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    header.extend_from_slice(&2u16.to_le_bytes());
    header.extend_from_slice(&4u16.to_le_bytes());
    header.extend_from_slice(&[0; 8]);
    header.extend_from_slice(&65535u32.to_le_bytes());
    header.extend_from_slice(&1u32.to_le_bytes());
    file.write_all(&header).unwrap();
    for (sec, usec, data) in frames {
        let len = (data.len() as u32).to_le_bytes();
        file.write_all(&sec.to_le_bytes()).unwrap();
        file.write_all(&usec.to_le_bytes()).unwrap();
        file.write_all(&len).unwrap();
        file.write_all(&len).unwrap();
        file.write_all(data).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn trace_replay_delivers_time_tagged_gotpacket_bundles() {
    let (socket, port) = receiver();
    let trace = ethernet_trace(&[
        (1_700_000_000, 0, http_frame()),
        (1_700_000_000, 500_000, vec![0xde, 0xad]),
        (1_700_000_001, 0, http_frame()),
    ]);

    let mut config = NplayConfig::default();
    config.osc.server = format!("127.0.0.1:{port}");
    config.capture.trace = Some(trace.path().to_path_buf());
    config.timing.time_warp = 2.0;
    config.timing.guard_interval = 0.0;
    let settings = config.resolve().unwrap();
    assert_eq!(settings.source, CaptureSource::Trace(trace.path().to_path_buf()));

    let stats = run_blocking(
        &settings,
        MetricsRecorder::new().unwrap(),
        Arc::new(AtomicBool::new(false)),
    )
    .unwrap();
    assert_eq!(stats.received, 3);
    assert_eq!(stats.emitted, 2);
    assert_eq!(stats.skipped, 1);

    let (first_tag, args) = recv_message(&socket);
    let (second_tag, _) = recv_message(&socket);
    assert_eq!(
        args,
        vec![
            OscArg::Int(0),
            OscArg::Int(72),
            OscArg::Int(51000),
            OscArg::Int(80),
            OscArg::Str("HTTP".into()),
            OscArg::Str("TCP".into()),
            OscArg::Int(93),
            OscArg::Int(192),
            OscArg::Str("93.184.216.34".into()),
        ]
    );
    // One second of capture at warp 2.0.
    let gap = second_tag.unwrap() - first_tag.unwrap();
    assert!((gap - 2.0).abs() < 1e-3, "gap was {gap}");
}

#[test]
fn in_memory_records_arrive_in_order_as_bare_messages() {
    let (socket, port) = receiver();
    let transmitter = UdpTransmitter::connect(&OscTarget {
        host: "127.0.0.1".into(),
        port,
    })
    .unwrap();

    let mut config = NplayConfig::default();
    config.capture.interface = Some("lo".into());
    config.classify.local_addr = Some("10.0.0.1".parse().unwrap());
    let settings = config.resolve().unwrap();
    assert!(!settings.bundle_timing);

    let records = (0..20u16).map(|i| {
        PacketRecord::new(f64::from(i), 60 + u32::from(i), "DATA")
            .with_network("10.0.0.9".parse().unwrap(), "10.0.0.1".parse().unwrap())
            .with_transport("UDP")
            .with_udp(40000 + i, 9000)
    });
    let mut pipeline =
        Pipeline::from_settings(&settings, transmitter, MetricsRecorder::new().unwrap());
    let stats = pipeline
        .run(&mut MemorySource::new(records), &AtomicBool::new(false))
        .unwrap();
    assert_eq!(stats.datagrams_sent, 20);

    for i in 0..20 {
        let (tag, args) = recv_message(&socket);
        assert!(tag.is_none());
        assert_eq!(args[0], OscArg::Int(1), "incoming");
        assert_eq!(args[2], OscArg::Int(40000 + i));
        assert_eq!(args[8], OscArg::Str("10.0.0.9".into()));
    }
}
