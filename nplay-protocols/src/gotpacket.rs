//! ## nplay-protocols::gotpacket
//! Encodes canonical events as `/gotpacket` OSC messages.
//!
//! Argument order: direction, length, source port, destination port (all
//! `i`), highest layer, transport (`s`), destination then source address
//! (two `i` high octets or two `s` literals), host (`s`).

use std::net::IpAddr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use nplay_core::event::CanonicalEvent;
use nplay_core::trigger::triggers_for;

use crate::osc::{EncodingError, OscBundle, OscMessage, TimeTag};

pub const GOTPACKET_ADDRESS: &str = "/gotpacket";

/// Default upper bound for a single string argument, in bytes.
pub const DEFAULT_MAX_STRING_LEN: usize = 1024;

/// How source/destination addresses are carried in `/gotpacket`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFormat {
    /// First byte of each address as an `i` argument.
    #[default]
    HighOctet,
    /// Each address as its textual form in an `s` argument.
    Literal,
}

/// First (most significant) byte of an address.
pub fn high_octet(addr: IpAddr) -> i32 {
    match addr {
        IpAddr::V4(v4) => i32::from(v4.octets()[0]),
        IpAddr::V6(v6) => i32::from(v6.octets()[0]),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PacketEncoder {
    address_format: AddressFormat,
    max_string_len: usize,
    triggers: bool,
}

impl Default for PacketEncoder {
    fn default() -> Self {
        Self::new(AddressFormat::default(), DEFAULT_MAX_STRING_LEN, false)
    }
}

impl PacketEncoder {
    pub fn new(address_format: AddressFormat, max_string_len: usize, triggers: bool) -> Self {
        Self {
            address_format,
            max_string_len,
            triggers,
        }
    }

    pub fn address_format(&self) -> AddressFormat {
        self.address_format
    }

    fn checked<'a>(&self, argument: &'static str, value: &'a str) -> Result<&'a str, EncodingError> {
        if value.len() > self.max_string_len {
            return Err(EncodingError::ArgumentTooLarge {
                argument,
                len: value.len(),
                max: self.max_string_len,
            });
        }
        Ok(value)
    }

    fn build(&self, address: &str, event: &CanonicalEvent) -> Result<OscMessage, EncodingError> {
        let mut msg = OscMessage::new(address)?;
        msg.push_int(event.direction.code());
        // Saturates; OSC `i` is signed 32-bit.
        msg.push_int(i32::try_from(event.length).unwrap_or(i32::MAX));
        msg.push_int(i32::from(event.src_port));
        msg.push_int(i32::from(event.dst_port));
        msg.push_str(self.checked("highest_layer", &event.highest_layer)?)?;
        msg.push_str(self.checked("transport", &event.transport)?)?;
        match self.address_format {
            AddressFormat::HighOctet => {
                msg.push_int(high_octet(event.dst));
                msg.push_int(high_octet(event.src));
            }
            AddressFormat::Literal => {
                msg.push_str(self.checked("dst", &event.dst.to_string())?)?;
                msg.push_str(self.checked("src", &event.src.to_string())?)?;
            }
        }
        msg.push_str(self.checked("host", &event.host.to_string())?)?;
        Ok(msg)
    }

    /// The `/gotpacket` message for `event`.
    pub fn message(&self, event: &CanonicalEvent) -> Result<OscMessage, EncodingError> {
        self.build(GOTPACKET_ADDRESS, event)
    }

    /// `/gotpacket` followed by the `/type/*` trigger messages when enabled.
    pub fn messages(&self, event: &CanonicalEvent) -> Result<Vec<OscMessage>, EncodingError> {
        let mut out = vec![self.message(event)?];
        if self.triggers {
            for trigger in triggers_for(event) {
                out.push(self.build(trigger.address(), event)?);
            }
        }
        Ok(out)
    }

    /// Serialises `event` as a bundle time-tagged with `delivery` (Unix seconds).
    pub fn encode(&self, event: &CanonicalEvent, delivery: f64) -> Result<Bytes, EncodingError> {
        let mut bundle = OscBundle::new(TimeTag::from_unix_secs(delivery));
        for msg in self.messages(event)? {
            bundle.push(msg);
        }
        bundle.to_bytes()
    }

    /// Serialises `event` as bare messages, one datagram each.
    pub fn encode_unbundled(&self, event: &CanonicalEvent) -> Result<Vec<Bytes>, EncodingError> {
        Ok(self
            .messages(event)?
            .iter()
            .map(OscMessage::to_bytes)
            .collect())
    }
}
