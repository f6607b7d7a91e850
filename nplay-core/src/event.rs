//! Canonical per-packet event.

use std::fmt;
use std::net::IpAddr;

use crate::record::TcpFlags;

/// Packet direction relative to the local host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Outgoing,
    Incoming,
    Unknown,
}

impl Direction {
    /// Integer code carried in OSC messages.
    pub fn code(self) -> i32 {
        match self {
            Direction::Outgoing => 0,
            Direction::Incoming => 1,
            Direction::Unknown => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Outgoing => "outgoing",
            Direction::Incoming => "incoming",
            Direction::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The field set extracted from one packet.
///
/// Built once by the `FieldExtractor` and moved through scheduling and
/// encoding by value.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEvent {
    pub direction: Direction,
    pub length: u32,
    /// Transport name, empty when the packet had none.
    pub transport: String,
    pub src: IpAddr,
    pub dst: IpAddr,
    /// The remote end of the conversation.
    pub host: IpAddr,
    pub highest_layer: String,
    /// Original capture timestamp (Unix seconds).
    pub timestamp: f64,
    pub src_port: u16,
    pub dst_port: u16,
    pub tcp_flags: Option<TcpFlags>,
    /// Application query carried by the packet, such as a DNS name.
    pub query: Option<String>,
}

impl fmt::Display for CanonicalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.direction {
            Direction::Incoming => "<-",
            Direction::Outgoing => "->",
            Direction::Unknown => "--",
        };
        write!(
            f,
            "{} {}:{} {} {}:{} {}",
            if self.transport.is_empty() {
                "-"
            } else {
                &self.transport
            },
            self.src,
            self.src_port,
            arrow,
            self.dst,
            self.dst_port,
            self.highest_layer
        )?;
        if let Some(query) = &self.query {
            write!(f, " query={query}")?;
        }
        Ok(())
    }
}
