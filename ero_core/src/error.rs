//! Error types for the ERO codec.

use std::path::PathBuf;

use thiserror::Error;

use crate::format::HeaderLayout;

/// Fatal conditions. Recoverable anomalies (skipped rows, truncated
/// payloads, encoding fallback) are structured outcomes, not errors.
#[derive(Debug, Error)]
pub enum EroError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input file does not exist.
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    /// The first four bytes are not the "ERO\0" signature.
    #[error("invalid ERO signature: expected 45 52 4f 00, found {found:02x?}")]
    BadSignature { found: [u8; 4] },

    /// The file ends before the selected header layout does.
    #[error("file too short for a {layout} header: need {expected} bytes, found {found}")]
    TruncatedHeader {
        layout: HeaderLayout,
        expected: usize,
        found: usize,
    },
}

/// A convenience `Result` type alias using the crate's `EroError` type.
pub type Result<T> = std::result::Result<T, EroError>;
