//! RecordIO header layout.

use crate::error::{CoreError, CoreResult};

/// Sync marker at the start of every record.
pub const RECORDIO_MAGIC: u32 = 0xced7_230a;

/// Size of the magic plus the flag/length word.
pub const PREFIX_SIZE: usize = 8;

/// Size of the sub-header: record flag (4) + label (4) + id0 (8) + id1 (8).
pub const SUB_HEADER_SIZE: usize = 24;

/// Mask for the low 29 bits of the flag/length word.
const LENGTH_MASK: u32 = (1 << 29) - 1;

/// Splits a flag/length word into `(flag, length)`.
///
/// The flag is the top three bits; a non-zero flag marks a multi-part
/// record.
#[must_use]
pub const fn split_length_word(word: u32) -> (u32, u32) {
    ((word >> 29) & 0b111, word & LENGTH_MASK)
}

/// Rounds `length` up to the next multiple of 4.
#[must_use]
pub const fn padded_length(length: u32) -> u64 {
    (length as u64 + 3) & !3
}

/// Number of padding bytes that follow a record of `length` bytes.
#[must_use]
pub const fn padding_for(length: u32) -> u64 {
    padded_length(length) - length as u64
}

/// Fixed fields of a single-part record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordHeader {
    /// Record length from the flag/length word, sub-header included.
    pub length: u32,
    /// Per-record flag. Stored but not interpreted.
    pub record_flag: u32,
    /// Label value.
    pub label: f32,
    /// Reserved id.
    pub id0: u64,
    /// Record id.
    pub id1: u64,
}

impl RecordHeader {
    /// Parses the 24-byte sub-header that follows the flag/length word.
    ///
    /// # Errors
    ///
    /// Returns a malformed container error if `sub` is shorter than
    /// [`SUB_HEADER_SIZE`].
    pub fn parse(length: u32, sub: &[u8]) -> CoreResult<Self> {
        if sub.len() < SUB_HEADER_SIZE {
            return Err(CoreError::malformed("truncated header"));
        }

        let record_flag = u32::from_le_bytes([sub[0], sub[1], sub[2], sub[3]]);
        let label = f32::from_le_bytes([sub[4], sub[5], sub[6], sub[7]]);
        let id0: [u8; 8] = sub[8..16]
            .try_into()
            .map_err(|_| CoreError::malformed("invalid id0"))?;
        let id1: [u8; 8] = sub[16..24]
            .try_into()
            .map_err(|_| CoreError::malformed("invalid id1"))?;

        Ok(Self {
            length,
            record_flag,
            label,
            id0: u64::from_le_bytes(id0),
            id1: u64::from_le_bytes(id1),
        })
    }

    /// Payload length, i.e. `length - 24`.
    #[must_use]
    pub const fn payload_len(&self) -> u32 {
        self.length.saturating_sub(SUB_HEADER_SIZE as u32)
    }

    /// Bytes this record occupies in the stream, prefix and padding included.
    #[must_use]
    pub const fn framed_len(&self) -> u64 {
        PREFIX_SIZE as u64 + padded_length(self.length)
    }
}
