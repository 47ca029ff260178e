//! RecordIO container decoding.
//!
//! A RecordIO stream is a sequence of single-part records:
//!
//! ```text
//! ┌────────────┬──────────────┬─────────────┬───────────┬──────────┬──────────┬───────────┬─────────┐
//! │ magic (4)  │ flag|len (4) │ rec flag (4)│ label (4) │ id0 (8)  │ id1 (8)  │ payload   │ padding │
//! └────────────┴──────────────┴─────────────┴───────────┴──────────┴──────────┴───────────┴─────────┘
//! ```
//!
//! All integers are little-endian. `len` counts the sub-header and the
//! payload; padding brings the record to a 4-byte boundary.

mod header;
mod reader;

pub use header::{
    padded_length, padding_for, split_length_word, RecordHeader, PREFIX_SIZE, RECORDIO_MAGIC,
    SUB_HEADER_SIZE,
};
pub use reader::RecordIoReader;

/// An undecoded record: header fields plus the encoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Parsed header.
    pub header: RecordHeader,
    /// Encoded image bytes, padding excluded.
    pub payload: Vec<u8>,
}

impl RawRecord {
    /// Record id (`id1`).
    #[must_use]
    pub fn id(&self) -> u64 {
        self.header.id1
    }

    /// Label value.
    #[must_use]
    pub fn label(&self) -> f32 {
        self.header.label
    }
}
