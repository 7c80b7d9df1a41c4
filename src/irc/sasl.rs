//! PLAIN SASL mechanism (RFC 4616) and IRC `AUTHENTICATE` framing.
//!
//! # Reference
//! - RFC 4616: <https://tools.ietf.org/html/rfc4616>
//! - IRCv3 SASL 3.1: <https://ircv3.net/specs/extensions/sasl-3.1>

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

/// Maximum payload bytes per `AUTHENTICATE` line.
pub const AUTHENTICATE_CHUNK_LEN: usize = 400;

/// Encode `authzid NUL authcid NUL password` with an empty authzid.
pub fn encode_plain(username: &str, password: &str) -> String {
    let payload = format!("\0{}\0{}", username, password);
    BASE64.encode(payload.as_bytes())
}

/// Split an encoded payload into `AUTHENTICATE` arguments.
///
/// A payload that is an exact multiple of the chunk size is terminated by
/// a lone `+`.
pub fn authenticate_chunks(encoded: &str) -> Vec<String> {
    let mut chunks: Vec<String> = encoded
        .as_bytes()
        .chunks(AUTHENTICATE_CHUNK_LEN)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect();
    if encoded.len() % AUTHENTICATE_CHUNK_LEN == 0 {
        chunks.push("+".to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain() {
        let encoded = encode_plain("notify", "hunter2");
        let decoded = BASE64.decode(&encoded).unwrap();
        assert_eq!(decoded, b"\0notify\0hunter2");
    }

    #[test]
    fn test_short_payload_is_single_chunk() {
        let encoded = encode_plain("notify", "hunter2");
        assert_eq!(authenticate_chunks(&encoded), vec![encoded]);
    }

    #[test]
    fn test_exact_multiple_ends_with_plus() {
        let encoded = "A".repeat(AUTHENTICATE_CHUNK_LEN * 2);
        let chunks = authenticate_chunks(&encoded);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], "+");
        assert!(chunks[..2].iter().all(|c| c.len() == AUTHENTICATE_CHUNK_LEN));
    }
}
