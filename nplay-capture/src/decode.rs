//! Frame decoding: link header, IP layer, transport and a port based guess
//! at the application protocol.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use etherparse::{LaxPacketHeaders, NetHeaders, TransportHeader};
use tracing::trace;

use nplay_core::record::{PacketRecord, TcpFlags};

use crate::dns;
use crate::packet::Frame;

const SLL_HEADER_LEN: usize = 16;
const NULL_HEADER_LEN: usize = 4;

/// Highest layer reported for frames the decoder could not parse.
pub const MALFORMED: &str = "MALFORMED";

/// Link-layer framings the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
    /// Bare IPv4/IPv6 datagrams.
    RawIp,
    /// Linux cooked capture (`any` device).
    LinuxSll,
    /// BSD loopback: 4-byte address family, then IP.
    Null,
}

impl LinkType {
    /// Maps a libpcap DLT value.
    pub fn from_dlt(dlt: i32) -> Option<Self> {
        match dlt {
            1 => Some(LinkType::Ethernet),
            12 | 14 | 101 | 228 | 229 => Some(LinkType::RawIp),
            113 => Some(LinkType::LinuxSll),
            0 | 108 => Some(LinkType::Null),
            _ => None,
        }
    }
}

/// Lax parsing: a frame cut short by snaplen still yields whatever headers
/// were captured in full.
fn parse_headers(frame: &Frame) -> Option<LaxPacketHeaders<'_>> {
    let data = &frame.data[..];
    let headers = match frame.link {
        LinkType::Ethernet => LaxPacketHeaders::from_ethernet(data).ok(),
        LinkType::RawIp => LaxPacketHeaders::from_ip(data).ok(),
        LinkType::LinuxSll => data
            .get(SLL_HEADER_LEN..)
            .and_then(|ip| LaxPacketHeaders::from_ip(ip).ok()),
        LinkType::Null => data
            .get(NULL_HEADER_LEN..)
            .and_then(|ip| LaxPacketHeaders::from_ip(ip).ok()),
    }?;
    if let Some((err, layer)) = &headers.stop_err {
        trace!(
            error = %err,
            ?layer,
            captured = data.len(),
            wire_len = frame.wire_len,
            "Frame decoded partially"
        );
    }
    Some(headers)
}

/// Guesses the application protocol from well-known ports. Only frames
/// carrying payload get an application layer.
fn application_layer(src_port: u16, dst_port: u16) -> Option<&'static str> {
    let by_port = |port: u16| match port {
        53 => Some("DNS"),
        5353 => Some("MDNS"),
        80 | 8080 => Some("HTTP"),
        443 => Some("TLS"),
        22 => Some("SSH"),
        123 => Some("NTP"),
        67 | 68 => Some("DHCP"),
        1900 => Some("SSDP"),
        _ => None,
    };
    by_port(dst_port).or_else(|| by_port(src_port))
}

/// Decodes a frame into a [`PacketRecord`]. Frames that fail to parse, or
/// carry no IP layer, produce a record without a network layer so the
/// pipeline can skip them with a diagnostic.
pub fn decode_frame(frame: &Frame) -> PacketRecord {
    let Some(headers) = parse_headers(frame) else {
        trace!(len = frame.data.len(), link = ?frame.link, "Undecodable frame");
        return PacketRecord::new(frame.timestamp, frame.wire_len, MALFORMED);
    };

    let (network, ip_name) = match &headers.net {
        Some(NetHeaders::Ipv4(ip, _)) => (
            Some((
                IpAddr::V4(Ipv4Addr::from(ip.source)),
                IpAddr::V4(Ipv4Addr::from(ip.destination)),
            )),
            "IP",
        ),
        Some(NetHeaders::Ipv6(ip, _)) => (
            Some((
                IpAddr::V6(Ipv6Addr::from(ip.source)),
                IpAddr::V6(Ipv6Addr::from(ip.destination)),
            )),
            "IPV6",
        ),
        _ => (None, "ETH"),
    };

    let payload = headers.payload.slice();
    let mut record = PacketRecord::new(frame.timestamp, frame.wire_len, ip_name);
    if let Some((src, dst)) = network {
        record = record.with_network(src, dst);
    }

    let ports = match &headers.transport {
        Some(TransportHeader::Tcp(tcp)) => {
            record = record
                .with_transport("TCP")
                .with_tcp(tcp.source_port, tcp.destination_port)
                .with_tcp_flags(TcpFlags {
                    syn: tcp.syn,
                    ack: tcp.ack,
                    fin: tcp.fin,
                    rst: tcp.rst,
                });
            Some((tcp.source_port, tcp.destination_port))
        }
        Some(TransportHeader::Udp(udp)) => {
            record = record
                .with_transport("UDP")
                .with_udp(udp.source_port, udp.destination_port);
            Some((udp.source_port, udp.destination_port))
        }
        Some(TransportHeader::Icmpv4(_)) => {
            record = record.with_transport("ICMP");
            None
        }
        Some(TransportHeader::Icmpv6(_)) => {
            record = record.with_transport("ICMPV6");
            None
        }
        None => None,
    };

    record.highest_layer = match (ports, record.transport.as_deref()) {
        (Some((sport, dport)), _) if !payload.is_empty() => {
            application_layer(sport, dport).unwrap_or("DATA").to_string()
        }
        (_, Some(transport)) => transport.to_string(),
        (_, None) => ip_name.to_string(),
    };

    if record.udp.is_some() && matches!(record.highest_layer.as_str(), "DNS" | "MDNS") {
        record.query = dns::query_name(payload);
    }

    record
}
