//! Property-based test generators using proptest.

use crate::builders::RecordSpec;
use proptest::prelude::*;

/// Strategy for arbitrary payload bytes, including empty payloads.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Strategy for a single well-formed RecordIO record.
pub fn record_spec_strategy() -> impl Strategy<Value = RecordSpec> {
    (
        any::<i16>(),
        any::<u64>(),
        any::<u64>(),
        payload_strategy(),
    )
        .prop_map(|(label, id0, id1, payload)| RecordSpec::new(f32::from(label), id0, id1, payload))
}

/// Strategy for a sequence of records forming one stream.
pub fn record_stream_strategy() -> impl Strategy<Value = Vec<RecordSpec>> {
    prop::collection::vec(record_spec_strategy(), 0..16)
}

/// Strategy for listing-file record names.
pub fn record_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9_]{1,12}\\.(jpg|png)").expect("Invalid regex")
}

/// Strategy for a 4-byte value that is not the RecordIO magic.
pub fn bad_magic_strategy() -> impl Strategy<Value = u32> {
    any::<u32>().prop_filter("must differ from the magic", |m| *m != crate::RECORDIO_MAGIC)
}
