//! nplay-capture
//!
//! Packet sources for the replay pipeline. Frames come from a live
//! interface or a pcap trace file (both through libpcap) and are decoded
//! into [`PacketRecord`]s.

pub mod decode;
pub mod dns;
pub mod error;
pub mod packet;
pub mod pcap_source;
pub mod source;

pub use decode::{decode_frame, LinkType};
pub use error::CaptureError;
pub use packet::Frame;
pub use pcap_source::{LiveOptions, LiveSource, TraceSource};
pub use source::{MemorySource, PacketSource};

pub use nplay_core::record::PacketRecord;
