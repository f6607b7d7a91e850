//! OSC packet parser.

use super::{padded_len, DecodeError, OscBundle, OscMessage, OscPacket, TimeTag, BUNDLE_TAG};

/// Parses a single OSC packet (message or bundle) from a datagram.
pub fn decode(data: &[u8]) -> Result<OscPacket, DecodeError> {
    if data.starts_with(BUNDLE_TAG) {
        decode_bundle(data).map(OscPacket::Bundle)
    } else {
        decode_message(data).map(OscPacket::Message)
    }
}

fn read_u32(input: &[u8], pos: &mut usize) -> Result<u32, DecodeError> {
    let bytes = input
        .get(*pos..*pos + 4)
        .ok_or(DecodeError::InsufficientData)?;
    *pos += 4;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_str<'a>(input: &'a [u8], pos: &mut usize) -> Result<&'a str, DecodeError> {
    let rest = input.get(*pos..).ok_or(DecodeError::InsufficientData)?;
    let nul = rest
        .iter()
        .position(|b| *b == 0)
        .ok_or(DecodeError::UnterminatedString)?;
    let total = padded_len(nul);
    if rest.len() < total {
        return Err(DecodeError::InsufficientData);
    }
    let s = std::str::from_utf8(&rest[..nul]).map_err(|_| DecodeError::InvalidUtf8)?;
    *pos += total;
    Ok(s)
}

fn decode_message(data: &[u8]) -> Result<OscMessage, DecodeError> {
    let mut pos = 0;
    let address = read_str(data, &mut pos)?;
    let mut message = OscMessage::new(address)
        .map_err(|_| DecodeError::InvalidAddress(address.to_string()))?;

    if pos >= data.len() {
        // Type tag string omitted: treat as no arguments.
        return Ok(message);
    }
    let tags = read_str(data, &mut pos)?;
    let tags = tags.strip_prefix(',').ok_or(DecodeError::MissingTypeTags)?;

    for tag in tags.chars() {
        match tag {
            'i' => message.push_int(read_u32(data, &mut pos)? as i32),
            's' => {
                let s = read_str(data, &mut pos)?;
                message
                    .push_str(s)
                    .map_err(|_| DecodeError::UnterminatedString)?;
            }
            other => return Err(DecodeError::UnsupportedTypeTag(other)),
        }
    }

    if pos != data.len() {
        return Err(DecodeError::TrailingBytes(data.len() - pos));
    }
    Ok(message)
}

fn decode_bundle(data: &[u8]) -> Result<OscBundle, DecodeError> {
    let mut pos = BUNDLE_TAG.len();
    let hi = read_u32(data, &mut pos)?;
    let lo = read_u32(data, &mut pos)?;
    let mut bundle = OscBundle::new(TimeTag::new(hi, lo));

    while pos < data.len() {
        let size = read_u32(data, &mut pos)? as i32;
        if size <= 0 || size % 4 != 0 {
            return Err(DecodeError::InvalidElementSize(size));
        }
        let end = pos + size as usize;
        let element = data.get(pos..end).ok_or(DecodeError::InsufficientData)?;
        bundle.elements.push(decode(element)?);
        pos = end;
    }
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_message_with_mixed_args() {
        let mut msg = OscMessage::new("/gotpacket").unwrap();
        msg.push_int(7);
        msg.push_str("TCP").unwrap();
        let decoded = decode(&msg.to_bytes()).unwrap();
        assert_eq!(decoded, OscPacket::Message(msg));
    }

    #[test]
    fn decodes_nested_bundle() {
        let mut inner = OscBundle::new(TimeTag::IMMEDIATE);
        inner.push(OscMessage::new("/inner").unwrap());
        let mut outer = OscBundle::new(TimeTag::new(3_900_000_000, 5));
        outer.push(OscMessage::new("/outer").unwrap());
        outer.push(inner);
        let bytes = outer.to_bytes().unwrap();
        assert_eq!(decode(&bytes).unwrap(), OscPacket::Bundle(outer));
    }

    #[test]
    fn truncated_int_argument() {
        let data = b"/x\0\0,i\0\0\0\0";
        assert_eq!(decode(data), Err(DecodeError::InsufficientData));
    }

    #[test]
    fn unterminated_address() {
        assert_eq!(decode(b"/abc"), Err(DecodeError::UnterminatedString));
    }

    #[test]
    fn unsupported_tag() {
        let data = b"/x\0\0,f\0\0\0\0\0\0";
        assert_eq!(decode(data), Err(DecodeError::UnsupportedTypeTag('f')));
    }

    #[test]
    fn bad_element_size() {
        let mut data = BUNDLE_TAG.to_vec();
        data.extend_from_slice(&[0; 8]);
        data.extend_from_slice(&[0, 0, 0, 3]);
        assert_eq!(decode(&data), Err(DecodeError::InvalidElementSize(3)));
    }
}
