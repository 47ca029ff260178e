//! Known-answer vectors for the container formats.

use crate::builders::RecordSpec;
use crate::fixtures::rgb_png;

/// A checksum test vector.
#[derive(Debug, Clone, Copy)]
pub struct CrcVector {
    /// Input bytes.
    pub input: &'static [u8],
    /// Expected CRC-32C (unmasked).
    pub crc32c: u32,
}

/// CRC-32C vectors from RFC 3720 and the common check string.
pub fn crc32c_vectors() -> Vec<CrcVector> {
    vec![
        CrcVector {
            input: b"",
            crc32c: 0x0000_0000,
        },
        CrcVector {
            input: b"123456789",
            crc32c: 0xE306_9283,
        },
        CrcVector {
            input: &[0u8; 32],
            crc32c: 0x8A91_36AA,
        },
        CrcVector {
            input: &[0xFFu8; 32],
            crc32c: 0x62A8_AB43,
        },
    ]
}

/// Label of the first record in the ImageNet validation stream.
pub const VALIDATION_LABEL: f32 = 577.0;

/// Reserved id of the first record in the ImageNet validation stream.
pub const VALIDATION_ID0: u64 = 16503;

/// Record id of the first record in the ImageNet validation stream.
pub const VALIDATION_ID1: u64 = 0;

/// A record shaped like the first ImageNet validation record, with a
/// small RGB PNG as payload.
pub fn validation_record() -> RecordSpec {
    RecordSpec::new(VALIDATION_LABEL, VALIDATION_ID0, VALIDATION_ID1, rgb_png(8, 6))
}
