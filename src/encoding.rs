//! URI component percent-encoding for path and query segments.
//!
//! The unreserved set matches `encodeURIComponent`, so every grammar
//! character (`> < ^ | \ [ ] { }`) is always escaped inside a key.

use std::fmt::Write;

use crate::error::TreeError;

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')'
        )
}

/// Percent-encode a single key or value.
pub fn encode_component(input: &str) -> String {
    if input.bytes().all(is_unreserved) {
        return input.to_string();
    }

    let mut encoded = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        if is_unreserved(byte) {
            encoded.push(byte as char);
        } else {
            // Writing into a String cannot fail.
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

/// Decode a percent-encoded key or value.
pub fn decode_component(input: &str) -> Result<String, TreeError> {
    if !input.contains('%') {
        return Ok(input.to_string());
    }

    let mut decoded = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] == b'%' {
            if index + 2 >= bytes.len() {
                return Err(TreeError::InvalidEncoding(input.to_string()));
            }
            match (hex_value(bytes[index + 1]), hex_value(bytes[index + 2])) {
                (Some(hi), Some(lo)) => {
                    decoded.push((hi << 4) | lo);
                    index += 3;
                    continue;
                }
                _ => return Err(TreeError::InvalidEncoding(input.to_string())),
            }
        }

        decoded.push(bytes[index]);
        index += 1;
    }

    String::from_utf8(decoded).map_err(|_| TreeError::InvalidEncoding(input.to_string()))
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
