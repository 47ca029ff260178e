//! TFRecord frame layout.

use crate::error::{CoreError, CoreResult};
use recset_codec::masked_crc32c;

/// Size of the length field plus its checksum.
pub const FRAME_HEADER_SIZE: usize = 12;

/// Size of the trailing data checksum.
pub const FRAME_FOOTER_SIZE: usize = 4;

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Number of data bytes.
    pub length: u64,
    /// Masked CRC-32C of the length bytes, as stored.
    pub length_crc: u32,
}

impl FrameHeader {
    /// Parses the 12-byte frame header.
    ///
    /// # Errors
    ///
    /// Returns a malformed container error if `bytes` is too short, or
    /// [`CoreError::ChecksumMismatch`] if `verify` is set and the length
    /// checksum is wrong.
    pub fn parse(bytes: &[u8], verify: bool) -> CoreResult<Self> {
        if bytes.len() < FRAME_HEADER_SIZE {
            return Err(CoreError::malformed("truncated frame header"));
        }

        let len_bytes: [u8; 8] = bytes[..8]
            .try_into()
            .map_err(|_| CoreError::malformed("invalid frame length"))?;
        let length_crc = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        if verify {
            verify_crc(&len_bytes, length_crc)?;
        }

        Ok(Self {
            length: u64::from_le_bytes(len_bytes),
            length_crc,
        })
    }

    /// Bytes the whole frame occupies in the stream.
    #[must_use]
    pub const fn framed_len(&self) -> u64 {
        FRAME_HEADER_SIZE as u64 + self.length + FRAME_FOOTER_SIZE as u64
    }
}

/// Checks `data` against a stored masked CRC-32C.
///
/// # Errors
///
/// Returns [`CoreError::ChecksumMismatch`] on mismatch.
pub fn verify_crc(data: &[u8], stored: u32) -> CoreResult<()> {
    let actual = masked_crc32c(data);
    if actual != stored {
        return Err(CoreError::ChecksumMismatch {
            expected: stored,
            actual,
        });
    }
    Ok(())
}
