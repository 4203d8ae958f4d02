pub mod encoding;
pub mod error;
pub mod format;
pub mod reader;
pub mod record;
pub mod table;
pub mod writer;

pub use encoding::TextEncoding;
pub use error::{EroError, Result};
pub use format::{EroHeader, HeaderLayout, LayoutMode, BLOCK_SIZE, SIGNATURE};
pub use reader::{DecodeSummary, Reader};
pub use record::{decode_block, encode_record, EncodedBlock, Outcome, Record, SkipReason};
pub use table::{parse_table, read_table, write_table, TableSummary};
pub use writer::{encode_to_vec, Writer};
