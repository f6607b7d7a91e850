//! Decoded packet records.
//!
//! A `PacketRecord` is what a capture source yields for every observed packet.
//! Only the timestamp, length and highest layer are always known; every other
//! field may be absent without preventing the rest from being used.

use std::fmt;
use std::net::IpAddr;

/// Network-layer addresses (IPv4 or IPv6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkLayer {
    pub src: IpAddr,
    pub dst: IpAddr,
}

/// Transport-layer port pair.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ports {
    pub src: u16,
    pub dst: u16,
}

impl Ports {
    pub fn new(src: u16, dst: u16) -> Self {
        Self { src, dst }
    }
}

/// The subset of TCP control flags that drives trigger messages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TcpFlags {
    pub syn: bool,
    pub ack: bool,
    pub fin: bool,
    pub rst: bool,
}

impl TcpFlags {
    pub fn none_set(&self) -> bool {
        !(self.syn || self.ack || self.fin || self.rst)
    }
}

/// One decoded packet, as produced by a capture source.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketRecord {
    /// Source/destination addresses, if a network layer was decoded.
    pub network: Option<NetworkLayer>,
    /// Total on-wire length in bytes.
    pub length: u32,
    /// Transport-layer protocol name (`TCP`, `UDP`, ...).
    pub transport: Option<String>,
    /// Name of the highest decoded protocol layer.
    pub highest_layer: String,
    /// Capture timestamp in seconds since the Unix epoch.
    pub timestamp: f64,
    pub udp: Option<Ports>,
    pub tcp: Option<Ports>,
    pub tcp_flags: Option<TcpFlags>,
    /// Decoded application-layer query (e.g. a DNS query name).
    pub query: Option<String>,
}

impl PacketRecord {
    /// Creates a record with only the mandatory fields populated.
    pub fn new(timestamp: f64, length: u32, highest_layer: impl Into<String>) -> Self {
        Self {
            network: None,
            length,
            transport: None,
            highest_layer: highest_layer.into(),
            timestamp,
            udp: None,
            tcp: None,
            tcp_flags: None,
            query: None,
        }
    }

    pub fn with_network(mut self, src: IpAddr, dst: IpAddr) -> Self {
        self.network = Some(NetworkLayer { src, dst });
        self
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = Some(transport.into());
        self
    }

    pub fn with_udp(mut self, src: u16, dst: u16) -> Self {
        self.udp = Some(Ports::new(src, dst));
        self
    }

    pub fn with_tcp(mut self, src: u16, dst: u16) -> Self {
        self.tcp = Some(Ports::new(src, dst));
        self
    }

    pub fn with_tcp_flags(mut self, flags: TcpFlags) -> Self {
        self.tcp_flags = Some(flags);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// One-line summary used in skip diagnostics.
impl fmt::Display for PacketRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ts={:.6} len={} layer={} transport={}",
            self.timestamp,
            self.length,
            self.highest_layer,
            self.transport.as_deref().unwrap_or("-"),
        )?;
        match self.network {
            Some(net) => write!(f, " {} -> {}", net.src, net.dst),
            None => write!(f, " (no network layer)"),
        }
    }
}
