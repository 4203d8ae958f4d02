//! Text and payload encodings.
//!
//! The binary side is WINDOWS-1252, the single-byte code page the legacy
//! Windows application actually produced. Every byte maps to a character and
//! back, which is what makes the byte-exact round-trip guarantee possible.
//! The text side is UTF-8 with BOM sniffing, falling back to WINDOWS-1252
//! for files saved by older tooling.

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Which encoding a text table file was ultimately decoded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Windows1252,
}

/// Decode a text table file. A leading BOM is consumed silently so its
/// presence never affects parsed content.
pub fn decode_text(raw: &[u8]) -> (String, TextEncoding) {
    let (decoded, _, had_errors) = UTF_8.decode(raw);
    if !had_errors {
        return (decoded.into_owned(), TextEncoding::Utf8);
    }
    tracing::warn!("input is not valid UTF-8, retrying as WINDOWS-1252");
    let (decoded, _, _) = WINDOWS_1252.decode(raw);
    (decoded.into_owned(), TextEncoding::Windows1252)
}

/// Encode a payload string as WINDOWS-1252. Characters outside the code
/// page become a single `?` each; this never fails. The bool reports
/// whether any substitution happened.
pub fn encode_payload(s: &str) -> (Vec<u8>, bool) {
    let (bytes, _, had_errors) = WINDOWS_1252.encode(s);
    if !had_errors {
        return (bytes.into_owned(), false);
    }
    // Slow path, character by character: encoding_rs expands unmappables
    // into numeric character references, which would inflate the payload.
    let mut out = Vec::with_capacity(s.len());
    let mut buf = [0u8; 4];
    for ch in s.chars() {
        let (bytes, _, err) = WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
        if err {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    (out, true)
}

/// Decode payload bytes. Total over all 256 byte values.
pub fn decode_payload(bytes: &[u8]) -> String {
    let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_consumed() {
        let (text, encoding) = decode_text(b"\xEF\xBB\xBF42;Salle Machines");
        assert_eq!(text, "42;Salle Machines");
        assert_eq!(encoding, TextEncoding::Utf8);
    }

    #[test]
    fn invalid_utf8_falls_back() {
        // 0xE9 is 'é' in WINDOWS-1252 but a bare continuation byte in UTF-8.
        let (text, encoding) = decode_text(b"12;Cat\xE9gorie");
        assert_eq!(text, "12;Catégorie");
        assert_eq!(encoding, TextEncoding::Windows1252);
    }

    #[test]
    fn unmappable_characters_become_question_marks() {
        let (bytes, substituted) = encode_payload("0001 Neige \u{2603} Nord");
        assert!(substituted);
        assert_eq!(bytes, b"0001 Neige ? Nord");
    }

    #[test]
    fn payload_roundtrip_is_byte_exact() {
        let (bytes, substituted) = encode_payload("0042 Catégorie n°1 — été");
        assert!(!substituted);
        assert_eq!(decode_payload(&bytes), "0042 Catégorie n°1 — été");
    }
}
