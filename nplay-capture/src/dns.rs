//! Minimal DNS question parsing: just enough to surface the queried name.

const HEADER_LEN: usize = 12;
const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 253;

/// Name of the first question in a DNS message, or `None` if the payload has
/// no question or the name is malformed. Compressed names are not followed.
pub fn query_name(payload: &[u8]) -> Option<String> {
    if payload.len() < HEADER_LEN {
        return None;
    }
    let qdcount = u16::from_be_bytes([payload[4], payload[5]]);
    if qdcount == 0 {
        return None;
    }

    let mut labels: Vec<String> = Vec::new();
    let mut pos = HEADER_LEN;
    let mut name_len = 0usize;
    loop {
        let len = *payload.get(pos)? as usize;
        pos += 1;
        if len == 0 {
            break;
        }
        // Pointer (0b11) and reserved (0b01, 0b10) label types.
        if len > MAX_LABEL_LEN {
            return None;
        }
        let label = payload.get(pos..pos + len)?;
        name_len += len + usize::from(!labels.is_empty());
        if name_len > MAX_NAME_LEN {
            return None;
        }
        labels.push(String::from_utf8_lossy(label).into_owned());
        pos += len;
    }

    if labels.is_empty() {
        // Root query.
        return Some(".".to_string());
    }
    Some(labels.join("."))
}
