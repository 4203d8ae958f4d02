use std::fs;
use std::path::Path;

use crate::error::{EroError, Result};

/// Signature prefix of every ERO file: "ERO\0".
pub const SIGNATURE: &[u8; 4] = b"ERO\x00";

/// Fixed size of one binary record block in bytes.
pub const BLOCK_SIZE: usize = 31;

/// Payload budget per block: everything before the terminator.
pub const PAYLOAD_BUDGET: usize = BLOCK_SIZE - 1;

/// Terminator byte closing every payload.
pub const TERMINATOR: u8 = 0x00;

/// Fill byte padding a block out to `BLOCK_SIZE`.
pub const FILL: u8 = 0xCD;

/// Fill byte used in the extended header's reserved buffer zone.
pub const BUFFER_FILL: u8 = 0xCC;

/// Size of the minimal header: signature + 12 opaque metadata bytes.
pub const MINIMAL_HEADER_SIZE: usize = 16;

/// Size of the extended header: 16-byte signature zone + 36-byte buffer zone.
pub const EXTENDED_HEADER_SIZE: usize = 52;

/// UTF-8 byte-order marker. Must never survive into a binary file; `inspect`
/// flags headers that carry it (a corruption seen in pre-V7 conversions).
pub const BOM_UTF8: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Default 16-byte signature zone.
///   "ERO\0" + FD×4 + DD×4 + 41 00 00 00
pub const DEFAULT_SIGNATURE_ZONE: [u8; MINIMAL_HEADER_SIZE] = [
    0x45, 0x52, 0x4F, 0x00, // "ERO\0"
    0xFD, 0xFD, 0xFD, 0xFD,
    0xDD, 0xDD, 0xDD, 0xDD,
    0x41, 0x00, 0x00, 0x00,
];

/// Default 36-byte reserved buffer zone of the extended layout:
/// a 5-byte prefix, the ASCII placeholder "<vide> ", then 0xCC fill.
pub const DEFAULT_BUFFER_ZONE: [u8; EXTENDED_HEADER_SIZE - MINIMAL_HEADER_SIZE] = [
    0x41, 0x00, 0x00, 0x00, 0x00, // buffer prefix
    0x3C, 0x76, 0x69, 0x64, 0x65, 0x3E, 0x20, // "<vide> "
    0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, //
    0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, // 24 bytes of 0xCC
    0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, //
];

/// Leading bytes of the extended buffer zone, keyed on for layout detection.
const BUFFER_ZONE_PREFIX: [u8; 5] = [0x41, 0x00, 0x00, 0x00, 0x00];

// ── Header layouts ─────────────────────────────────────────────────────────

/// The two header generations observed in ERO files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// 16 bytes: signature + opaque metadata tail.
    Minimal,
    /// 52 bytes: signature zone + reserved buffer zone.
    Extended,
}

impl HeaderLayout {
    pub fn size(self) -> usize {
        match self {
            HeaderLayout::Minimal => MINIMAL_HEADER_SIZE,
            HeaderLayout::Extended => EXTENDED_HEADER_SIZE,
        }
    }
}

impl std::fmt::Display for HeaderLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderLayout::Minimal => write!(f, "minimal"),
            HeaderLayout::Extended => write!(f, "extended"),
        }
    }
}

/// How to resolve the header layout when opening a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Detect from the bytes at offset 16 (see [`EroHeader::parse`]).
    Auto,
    /// Trust the caller; fail if the file is shorter than the layout.
    Fixed(HeaderLayout),
}

// ── Header ─────────────────────────────────────────────────────────────────

/// Parsed ERO file header.
///
/// Beyond the 4-byte signature the header is an opaque blob: the legacy
/// application's use of the remaining bytes is unknown, so they are carried
/// verbatim and re-emitted byte-exact when a file is re-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EroHeader {
    layout: HeaderLayout,
    bytes: Vec<u8>,
}

impl EroHeader {
    /// The documented default header for `layout`.
    pub fn default_for(layout: HeaderLayout) -> Self {
        let mut bytes = DEFAULT_SIGNATURE_ZONE.to_vec();
        if layout == HeaderLayout::Extended {
            bytes.extend_from_slice(&DEFAULT_BUFFER_ZONE);
        }
        Self { layout, bytes }
    }

    /// Parse a header from the start of `data`.
    ///
    /// Validates the signature, then resolves the layout. `Auto` keys on the
    /// extended buffer-zone prefix at offset 16: a record payload cannot
    /// contain 0x00 before its terminator, so block data starting with that
    /// prefix could never have been a valid record anyway.
    pub fn parse(data: &[u8], mode: LayoutMode) -> Result<Self> {
        if data.len() < SIGNATURE.len() {
            return Err(EroError::TruncatedHeader {
                layout: HeaderLayout::Minimal,
                expected: MINIMAL_HEADER_SIZE,
                found: data.len(),
            });
        }
        if &data[..SIGNATURE.len()] != SIGNATURE {
            let mut found = [0u8; 4];
            found.copy_from_slice(&data[..4]);
            return Err(EroError::BadSignature { found });
        }

        let layout = match mode {
            LayoutMode::Fixed(layout) => layout,
            LayoutMode::Auto => Self::detect(data),
        };
        if data.len() < layout.size() {
            return Err(EroError::TruncatedHeader {
                layout,
                expected: layout.size(),
                found: data.len(),
            });
        }

        Ok(Self {
            layout,
            bytes: data[..layout.size()].to_vec(),
        })
    }

    /// Read and parse only the header of an existing ERO file, to be carried
    /// over verbatim onto a re-encoded file.
    pub fn from_file(path: impl AsRef<Path>, mode: LayoutMode) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EroError::InputNotFound(path.to_path_buf()));
        }
        let data = fs::read(path)?;
        Self::parse(&data, mode)
    }

    fn detect(data: &[u8]) -> HeaderLayout {
        let zone = MINIMAL_HEADER_SIZE..MINIMAL_HEADER_SIZE + BUFFER_ZONE_PREFIX.len();
        if data.len() >= EXTENDED_HEADER_SIZE && data[zone] == BUFFER_ZONE_PREFIX {
            HeaderLayout::Extended
        } else {
            HeaderLayout::Minimal
        }
    }

    pub fn layout(&self) -> HeaderLayout {
        self.layout
    }

    /// Raw header bytes, signature included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Header size in bytes (16 or 52).
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// True when UTF-8 BOM bytes appear anywhere in the header zone.
    pub fn contains_bom(&self) -> bool {
        self.bytes.windows(BOM_UTF8.len()).any(|w| w == BOM_UTF8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_have_documented_sizes() {
        assert_eq!(EroHeader::default_for(HeaderLayout::Minimal).size(), 16);
        assert_eq!(EroHeader::default_for(HeaderLayout::Extended).size(), 52);
        assert!(EroHeader::default_for(HeaderLayout::Extended)
            .as_bytes()
            .starts_with(SIGNATURE));
    }

    #[test]
    fn auto_detection_distinguishes_layouts() {
        let extended = EroHeader::default_for(HeaderLayout::Extended);
        let parsed = EroHeader::parse(extended.as_bytes(), LayoutMode::Auto).unwrap();
        assert_eq!(parsed.layout(), HeaderLayout::Extended);

        // Minimal header followed by a record block: offset 16 holds payload
        // text, not the buffer-zone prefix.
        let mut data = DEFAULT_SIGNATURE_ZONE.to_vec();
        data.extend_from_slice(b"0001 Local Serveur\x00");
        data.resize(16 + BLOCK_SIZE, FILL);
        let parsed = EroHeader::parse(&data, LayoutMode::Auto).unwrap();
        assert_eq!(parsed.layout(), HeaderLayout::Minimal);
    }

    #[test]
    fn fixed_mode_overrides_detection() {
        let extended = EroHeader::default_for(HeaderLayout::Extended);
        let parsed = EroHeader::parse(
            extended.as_bytes(),
            LayoutMode::Fixed(HeaderLayout::Minimal),
        )
        .unwrap();
        assert_eq!(parsed.size(), MINIMAL_HEADER_SIZE);
    }

    #[test]
    fn bad_signature_is_rejected() {
        let err = EroHeader::parse(b"XRO\x00 not an ero file", LayoutMode::Auto).unwrap_err();
        assert!(matches!(err, EroError::BadSignature { .. }));
    }

    #[test]
    fn short_file_is_rejected() {
        let err = EroHeader::parse(b"ERO\x00\xFD\xFD", LayoutMode::Auto).unwrap_err();
        assert!(matches!(err, EroError::TruncatedHeader { .. }));

        let err = EroHeader::parse(
            &DEFAULT_SIGNATURE_ZONE,
            LayoutMode::Fixed(HeaderLayout::Extended),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EroError::TruncatedHeader {
                expected: EXTENDED_HEADER_SIZE,
                found: MINIMAL_HEADER_SIZE,
                ..
            }
        ));
    }

    #[test]
    fn bom_residue_is_detected() {
        let clean = EroHeader::default_for(HeaderLayout::Extended);
        assert!(!clean.contains_bom());

        let mut bytes = clean.as_bytes().to_vec();
        bytes[20..23].copy_from_slice(&BOM_UTF8);
        let dirty = EroHeader::parse(&bytes, LayoutMode::Fixed(HeaderLayout::Extended)).unwrap();
        assert!(dirty.contains_bom());
    }
}
