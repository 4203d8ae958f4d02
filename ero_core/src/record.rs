//! The fixed 31-byte record codec.
//!
//! Block layout: payload bytes (code + space + text, WINDOWS-1252, at most
//! 30 bytes), one 0x00 terminator, then 0xCD fill up to the 31-byte
//! boundary. The terminator is always present, exactly once, and fill
//! never precedes it.

use crate::encoding::{decode_payload, encode_payload};
use crate::format::{BLOCK_SIZE, BUFFER_FILL, FILL, PAYLOAD_BUDGET, TERMINATOR};

/// Minimum viable decoded payload: "0000 X".
const MIN_PAYLOAD_CHARS: usize = 6;

/// One logical table row: a short code and its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub code: String,
    pub text: String,
}

impl Record {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }
}

/// Why a unit (text line or binary block) was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Text line with no `;` separator.
    MissingSeparator,
    /// Blank text line.
    BlankLine,
    /// Decoded payload shorter than the minimum "0000 X".
    PayloadTooShort,
    /// The first four payload characters are not all decimal digits.
    NonNumericCode,
    /// No space between code and text.
    MissingSpace,
    /// Text empty after stripping non-printable characters.
    EmptyText,
}

impl SkipReason {
    pub fn describe(self) -> &'static str {
        match self {
            SkipReason::MissingSeparator => "no ';' separator",
            SkipReason::BlankLine => "blank line",
            SkipReason::PayloadTooShort => "payload shorter than \"0000 X\"",
            SkipReason::NonNumericCode => "code is not four decimal digits",
            SkipReason::MissingSpace => "no space after the code",
            SkipReason::EmptyText => "empty text",
        }
    }
}

/// Decode result for one unit. Skips are the normal path for malformed
/// legacy data; callers count them rather than catching errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Record),
    Skipped(SkipReason),
}

/// A freshly encoded block, plus whether its payload was cut to fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBlock {
    pub bytes: [u8; BLOCK_SIZE],
    pub truncated: bool,
}

/// Normalize a raw code field: integers become four zero-padded decimal
/// digits, anything else is cut to its first four characters and padded
/// with spaces.
pub fn normalize_code(raw: &str) -> String {
    match raw.parse::<u32>() {
        Ok(n) => format!("{n:04}"),
        Err(_) => {
            let head: String = raw.chars().take(4).collect();
            format!("{head:<4}")
        }
    }
}

/// Encode one record into exactly [`BLOCK_SIZE`] bytes.
///
/// The block is born fully filled, so the fixed size holds by construction
/// for any input length, including empty text and text far over budget.
pub fn encode_record(record: &Record) -> EncodedBlock {
    let code = normalize_code(&record.code);
    let full = format!("{code} {text}", text = record.text);

    let (encoded, substituted) = encode_payload(&full);
    if substituted {
        tracing::warn!(code = %code, "characters outside WINDOWS-1252 replaced with '?'");
    }

    let truncated = encoded.len() > PAYLOAD_BUDGET;
    if truncated {
        tracing::warn!(
            code = %code,
            len = encoded.len(),
            "payload exceeds {PAYLOAD_BUDGET} bytes, truncating"
        );
    }
    let payload = &encoded[..encoded.len().min(PAYLOAD_BUDGET)];

    let mut bytes = [FILL; BLOCK_SIZE];
    bytes[..payload.len()].copy_from_slice(payload);
    bytes[payload.len()] = TERMINATOR;
    EncodedBlock { bytes, truncated }
}

/// Decode one block back into a record, or classify why it isn't one.
///
/// The payload is everything before the first terminator; a block with no
/// terminator at all is treated as payload in full (malformed-block
/// fallback). Structural failures are silently classified, mirroring the
/// permissive legacy data this format ships with.
pub fn decode_block(block: &[u8]) -> Outcome {
    let payload = match block.iter().position(|&b| b == TERMINATOR) {
        Some(end) => &block[..end],
        None => block,
    };
    let decoded = decode_payload(trim_fill(payload));

    let chars: Vec<char> = decoded.chars().collect();
    if chars.len() < MIN_PAYLOAD_CHARS {
        return Outcome::Skipped(SkipReason::PayloadTooShort);
    }
    if !chars[..4].iter().all(|c| c.is_ascii_digit()) {
        return Outcome::Skipped(SkipReason::NonNumericCode);
    }
    if chars[4] != ' ' {
        return Outcome::Skipped(SkipReason::MissingSpace);
    }

    let code: String = chars[..4].iter().collect();
    let text: String = chars[5..].iter().filter(|c| !c.is_control()).collect();
    let text = text.trim();
    if text.is_empty() {
        return Outcome::Skipped(SkipReason::EmptyText);
    }

    Outcome::Accepted(Record::new(code, text))
}

/// Strip fill artifacts (0xCD block fill, 0xCC buffer fill) from both ends
/// of a payload. Damaged files leave them on either side.
fn trim_fill(bytes: &[u8]) -> &[u8] {
    let is_fill = |b: &u8| *b == FILL || *b == BUFFER_FILL;
    let start = match bytes.iter().position(|b| !is_fill(b)) {
        Some(i) => i,
        None => return &[],
    };
    let end = bytes.iter().rposition(|b| !is_fill(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_codes_are_zero_padded() {
        assert_eq!(normalize_code("42"), "0042");
        assert_eq!(normalize_code("0042"), "0042");
        assert_eq!(normalize_code("8000"), "8000");
    }

    #[test]
    fn non_numeric_codes_are_cut_and_padded() {
        assert_eq!(normalize_code("BATIMENT TECHNIQUE"), "BATI");
        assert_eq!(normalize_code("AB"), "AB  ");
        assert_eq!(normalize_code(""), "    ");
    }

    #[test]
    fn terminator_sits_right_after_the_payload() {
        let block = encode_record(&Record::new("42", "Salle Machines"));
        assert!(!block.truncated);
        assert_eq!(&block.bytes[..19], b"0042 Salle Machines");
        assert_eq!(block.bytes[19], TERMINATOR);
        assert!(block.bytes[20..].iter().all(|&b| b == FILL));
    }

    #[test]
    fn empty_text_still_yields_a_full_block() {
        let block = encode_record(&Record::new("7", ""));
        assert_eq!(&block.bytes[..5], b"0007 ");
        assert_eq!(block.bytes[5], TERMINATOR);
        assert!(block.bytes[6..].iter().all(|&b| b == FILL));
    }

    #[test]
    fn over_budget_payload_is_truncated() {
        let text = "X".repeat(60);
        let block = encode_record(&Record::new("1", &text));
        assert!(block.truncated);
        assert_eq!(block.bytes[PAYLOAD_BUDGET], TERMINATOR);
        assert!(block.bytes[..PAYLOAD_BUDGET].iter().all(|&b| b != TERMINATOR));
    }

    #[test]
    fn block_without_terminator_is_still_classified() {
        // Whole block as payload: 31 'A's decode but fail the digit check.
        let block = [b'A'; BLOCK_SIZE];
        assert_eq!(decode_block(&block), Outcome::Skipped(SkipReason::NonNumericCode));
    }

    #[test]
    fn all_fill_block_is_too_short() {
        let block = [FILL; BLOCK_SIZE];
        assert_eq!(decode_block(&block), Outcome::Skipped(SkipReason::PayloadTooShort));
    }

    #[test]
    fn whitespace_only_text_is_discarded() {
        let mut block = [FILL; BLOCK_SIZE];
        block[..8].copy_from_slice(b"0042    ");
        block[8] = TERMINATOR;
        assert_eq!(decode_block(&block), Outcome::Skipped(SkipReason::EmptyText));
    }

    #[test]
    fn code_followed_by_non_space_is_discarded() {
        let mut block = [FILL; BLOCK_SIZE];
        block[..10].copy_from_slice(b"00425Salle");
        block[10] = TERMINATOR;
        assert_eq!(decode_block(&block), Outcome::Skipped(SkipReason::MissingSpace));
    }
}
