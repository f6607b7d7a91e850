//! ## nplay-protocols::osc
//! OSC 1.0 messages and bundles.
//!
//! Wire layout:
//! - strings are NUL terminated and padded with NULs to a 4-byte boundary
//! - the type tag string is `,` followed by one tag per argument
//! - `i` arguments are 4-byte big-endian two's complement
//! - a bundle is `#bundle\0`, an 8-byte time-tag, then elements each prefixed
//!   by a 4-byte big-endian size

mod decode;
mod error;
mod timetag;

use bytes::{BufMut, Bytes, BytesMut};

pub use decode::decode;
pub use error::{DecodeError, EncodingError};
pub use timetag::{TimeTag, NTP_UNIX_OFFSET};

pub const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";

/// A typed OSC argument.
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Int(i32),
    Str(String),
}

impl OscArg {
    pub fn type_tag(&self) -> u8 {
        match self {
            OscArg::Int(_) => b'i',
            OscArg::Str(_) => b's',
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            OscArg::Int(_) => 4,
            OscArg::Str(s) => padded_len(s.len()),
        }
    }
}

/// Length of a NUL-terminated string padded to 4 bytes.
#[inline]
pub(crate) fn padded_len(len: usize) -> usize {
    (len / 4 + 1) * 4
}

fn put_padded_str(buf: &mut BytesMut, s: &[u8]) {
    buf.put_slice(s);
    let pad = padded_len(s.len()) - s.len();
    buf.put_bytes(0, pad);
}

/// An OSC message: an address pattern and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    address: String,
    args: Vec<OscArg>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>) -> Result<Self, EncodingError> {
        let address = address.into();
        if !address.starts_with('/') {
            return Err(EncodingError::InvalidAddress(address));
        }
        if address.bytes().any(|b| b == 0) {
            return Err(EncodingError::EmbeddedNul);
        }
        Ok(Self {
            address,
            args: Vec::new(),
        })
    }

    pub fn push_int(&mut self, value: i32) {
        self.args.push(OscArg::Int(value));
    }

    pub fn push_str(&mut self, value: impl Into<String>) -> Result<(), EncodingError> {
        let value = value.into();
        if value.bytes().any(|b| b == 0) {
            return Err(EncodingError::EmbeddedNul);
        }
        self.args.push(OscArg::Str(value));
        Ok(())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn args(&self) -> &[OscArg] {
        &self.args
    }

    pub fn type_tags(&self) -> String {
        let mut tags = String::with_capacity(self.args.len() + 1);
        tags.push(',');
        tags.extend(self.args.iter().map(|a| a.type_tag() as char));
        tags
    }

    pub fn encoded_len(&self) -> usize {
        padded_len(self.address.len())
            + padded_len(self.args.len() + 1)
            + self.args.iter().map(OscArg::encoded_len).sum::<usize>()
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        put_padded_str(buf, self.address.as_bytes());
        put_padded_str(buf, self.type_tags().as_bytes());
        for arg in &self.args {
            match arg {
                OscArg::Int(v) => buf.put_i32(*v),
                OscArg::Str(s) => put_padded_str(buf, s.as_bytes()),
            }
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }
}

/// An OSC bundle: a time-tag and one or more elements.
#[derive(Debug, Clone, PartialEq)]
pub struct OscBundle {
    pub timetag: TimeTag,
    pub elements: Vec<OscPacket>,
}

impl OscBundle {
    pub fn new(timetag: TimeTag) -> Self {
        Self {
            timetag,
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: impl Into<OscPacket>) {
        self.elements.push(element.into());
    }

    pub fn encoded_len(&self) -> usize {
        16 + self
            .elements
            .iter()
            .map(|e| 4 + e.encoded_len())
            .sum::<usize>()
    }

    pub fn encode_into(&self, buf: &mut BytesMut) -> Result<(), EncodingError> {
        if self.elements.is_empty() {
            return Err(EncodingError::EmptyBundle);
        }
        buf.reserve(self.encoded_len());
        buf.put_slice(BUNDLE_TAG);
        buf.put_u64(self.timetag.to_u64());
        for element in &self.elements {
            buf.put_i32(element.encoded_len() as i32);
            element.encode_into(buf)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Bytes, EncodingError> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Either top-level OSC packet form.
#[derive(Debug, Clone, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle(OscBundle),
}

impl OscPacket {
    pub fn encoded_len(&self) -> usize {
        match self {
            OscPacket::Message(m) => m.encoded_len(),
            OscPacket::Bundle(b) => b.encoded_len(),
        }
    }

    pub fn encode_into(&self, buf: &mut BytesMut) -> Result<(), EncodingError> {
        match self {
            OscPacket::Message(m) => {
                m.encode_into(buf);
                Ok(())
            }
            OscPacket::Bundle(b) => b.encode_into(buf),
        }
    }

    pub fn to_bytes(&self) -> Result<Bytes, EncodingError> {
        match self {
            OscPacket::Message(m) => Ok(m.to_bytes()),
            OscPacket::Bundle(b) => b.to_bytes(),
        }
    }
}

impl From<OscMessage> for OscPacket {
    fn from(message: OscMessage) -> Self {
        OscPacket::Message(message)
    }
}

impl From<OscBundle> for OscPacket {
    fn from(bundle: OscBundle) -> Self {
        OscPacket::Bundle(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_lengths() {
        assert_eq!(padded_len(0), 4);
        assert_eq!(padded_len(3), 4);
        assert_eq!(padded_len(4), 8);
        assert_eq!(padded_len(10), 12);
    }

    #[test]
    fn rejects_relative_address() {
        assert!(matches!(
            OscMessage::new("gotpacket"),
            Err(EncodingError::InvalidAddress(_))
        ));
    }

    #[test]
    fn rejects_nul_in_string() {
        let mut msg = OscMessage::new("/x").unwrap();
        assert_eq!(msg.push_str("a\0b"), Err(EncodingError::EmbeddedNul));
    }

    #[test]
    fn message_wire_bytes() {
        // Byte-exact layout: "/foo" has length 4, so it takes 8 bytes.
        let mut msg = OscMessage::new("/foo").unwrap();
        msg.push_int(1000);
        msg.push_int(-1);
        msg.push_str("hello").unwrap();
        let bytes = msg.to_bytes();
        let expected: &[u8] = &[
            b'/', b'f', b'o', b'o', 0, 0, 0, 0, // address
            b',', b'i', b'i', b's', 0, 0, 0, 0, // type tags
            0x00, 0x00, 0x03, 0xE8, // 1000
            0xFF, 0xFF, 0xFF, 0xFF, // -1
            b'h', b'e', b'l', b'l', b'o', 0, 0, 0, // "hello"
        ];
        assert_eq!(&bytes[..], expected);
        assert_eq!(msg.encoded_len(), expected.len());
    }

    #[test]
    fn bundle_wire_layout() {
        let msg = OscMessage::new("/a").unwrap();
        let mut bundle = OscBundle::new(TimeTag::new(1, 2));
        bundle.push(msg);
        let bytes = bundle.to_bytes().unwrap();
        assert_eq!(&bytes[..8], BUNDLE_TAG);
        assert_eq!(&bytes[8..16], &[0, 0, 0, 1, 0, 0, 0, 2]);
        // "/a" (4) + "," (4)
        assert_eq!(&bytes[16..20], &[0, 0, 0, 8]);
        assert_eq!(&bytes[20..], b"/a\0\0,\0\0\0");
        assert_eq!(bundle.encoded_len(), bytes.len());
    }

    #[test]
    fn empty_bundle_is_rejected() {
        let bundle = OscBundle::new(TimeTag::IMMEDIATE);
        assert_eq!(bundle.to_bytes(), Err(EncodingError::EmptyBundle));
    }
}
