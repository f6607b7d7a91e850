use bytes::Bytes;

use crate::decode::LinkType;

/// A raw captured frame plus the pcap header fields the decoder needs.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Bytes,
    /// Capture time, Unix seconds.
    pub timestamp: f64,
    /// Length on the wire, which may exceed `data.len()` when truncated by snaplen.
    pub wire_len: u32,
    pub link: LinkType,
}

impl Frame {
    pub fn new(data: impl Into<Bytes>, timestamp: f64, wire_len: u32, link: LinkType) -> Self {
        Frame {
            data: data.into(),
            timestamp,
            wire_len,
            link,
        }
    }

    /// Frame whose wire length equals the captured length.
    pub fn untruncated(data: impl Into<Bytes>, timestamp: f64, link: LinkType) -> Self {
        let data = data.into();
        let wire_len = data.len() as u32;
        Frame::new(data, timestamp, wire_len, link)
    }

    pub(crate) fn from_pcap(packet: &pcap::Packet<'_>, link: LinkType) -> Self {
        let ts = packet.header.ts;
        let timestamp = ts.tv_sec as f64 + ts.tv_usec as f64 / 1_000_000.0;
        Frame::new(
            Bytes::copy_from_slice(packet.data),
            timestamp,
            packet.header.len,
            link,
        )
    }
}
