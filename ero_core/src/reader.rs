use std::fs;
use std::path::Path;

use crate::error::{EroError, Result};
use crate::format::{EroHeader, LayoutMode, BLOCK_SIZE};
use crate::record::{decode_block, Outcome, Record, SkipReason};

/// Whole-file reader for ERO binaries.
///
/// # Open sequence
/// 1. Read the entire file (these files are small; see the in-memory model).
/// 2. Parse and validate the header for the selected layout mode.
/// 3. Expose the fixed 31-byte blocks that follow it.
///
/// A trailing block shorter than 31 bytes is an incomplete record and is
/// discarded, never yielded.
#[derive(Debug)]
pub struct Reader {
    header: EroHeader,
    data: Vec<u8>,
}

/// Decoded records plus the blocks that failed structural validation,
/// with zero-based block indices.
#[derive(Debug, Default)]
pub struct DecodeSummary {
    pub records: Vec<Record>,
    pub skipped: Vec<(usize, SkipReason)>,
}

impl Reader {
    /// Open an ERO file. Fails on a missing file, a bad signature, or a
    /// file shorter than its header.
    pub fn open(path: impl AsRef<Path>, mode: LayoutMode) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EroError::InputNotFound(path.to_path_buf()));
        }
        let data = fs::read(path)?;
        let header = EroHeader::parse(&data, mode)?;
        Ok(Self { header, data })
    }

    pub fn header(&self) -> &EroHeader {
        &self.header
    }

    /// Complete 31-byte blocks after the header, in file order.
    pub fn blocks(&self) -> impl Iterator<Item = &[u8]> {
        self.data[self.header.size()..].chunks_exact(BLOCK_SIZE)
    }

    /// Number of complete blocks in the file.
    pub fn block_count(&self) -> usize {
        (self.data.len() - self.header.size()) / BLOCK_SIZE
    }

    /// Bytes left over in a trailing incomplete block; zero for clean files.
    pub fn trailing_bytes(&self) -> usize {
        (self.data.len() - self.header.size()) % BLOCK_SIZE
    }

    /// Decode every block, collecting accepted records and skip reasons.
    pub fn decode(&self) -> DecodeSummary {
        let mut summary = DecodeSummary::default();
        for (idx, block) in self.blocks().enumerate() {
            match decode_block(block) {
                Outcome::Accepted(record) => summary.records.push(record),
                Outcome::Skipped(reason) => {
                    tracing::debug!(block = idx, reason = reason.describe(), "block skipped");
                    summary.skipped.push((idx, reason));
                }
            }
        }
        summary
    }
}
