//! # nplay Protocols
//!
//! OSC 1.0 wire codec and the `/gotpacket` event encoding built on it.

pub mod gotpacket;
pub mod osc;

pub use gotpacket::{AddressFormat, PacketEncoder, GOTPACKET_ADDRESS};
pub use osc::{DecodeError, EncodingError, OscArg, OscBundle, OscMessage, OscPacket, TimeTag};
