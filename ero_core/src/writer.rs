use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::format::{EroHeader, BLOCK_SIZE};
use crate::record::{encode_record, Record};

/// Sequential writer for ERO binaries.
///
/// # Write contract
/// [`create`] emits the header up front (either the layout default or a
/// header carried over from a reference file). Each [`write_record`] call
/// appends exactly one 31-byte block. Call [`finish`] to flush and get the
/// final block count.
///
/// [`create`]: Writer::create
/// [`write_record`]: Writer::write_record
/// [`finish`]: Writer::finish
pub struct Writer {
    file: File,
    blocks_written: u64,
    truncated: u64,
}

impl Writer {
    /// Create a new ERO file at `path`, overwriting any existing file.
    pub fn create(path: impl AsRef<Path>, header: &EroHeader) -> Result<Self> {
        let mut file = File::create(path)?;
        file.write_all(header.as_bytes())?;
        Ok(Self {
            file,
            blocks_written: 0,
            truncated: 0,
        })
    }

    /// Encode `record` and append its block. Returns whether the payload
    /// had to be truncated to the 30-byte budget (non-fatal).
    pub fn write_record(&mut self, record: &Record) -> Result<bool> {
        let block = encode_record(record);
        self.file.write_all(&block.bytes)?;
        self.blocks_written += 1;
        if block.truncated {
            self.truncated += 1;
        }
        Ok(block.truncated)
    }

    /// Records whose payload was truncated so far.
    pub fn truncated(&self) -> u64 {
        self.truncated
    }

    /// Flush and seal the file. Returns the number of blocks written.
    pub fn finish(mut self) -> Result<u64> {
        self.file.flush()?;
        Ok(self.blocks_written)
    }
}

/// Encode a full table to bytes in memory: header, then one block per
/// record. Used by the round-trip verifier.
pub fn encode_to_vec(header: &EroHeader, records: &[Record]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header.size() + records.len() * BLOCK_SIZE);
    out.extend_from_slice(header.as_bytes());
    for record in records {
        out.extend_from_slice(&encode_record(record).bytes);
    }
    out
}
