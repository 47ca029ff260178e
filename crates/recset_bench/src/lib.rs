//! Benchmark fixtures.

use recset_testkit::{classification_example, RecordIoBuilder, TfRecordBuilder};

/// Deterministic payload of the given size.
pub fn payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// A RecordIO container of `count` records with `size`-byte payloads,
/// plus the byte range of every record.
pub fn recordio_container(count: usize, size: usize) -> (Vec<u8>, Vec<(u64, u64)>) {
    let data = payload(size);
    let builder = (0..count).fold(RecordIoBuilder::new(), |builder, i| {
        builder.record((i % 1000) as f32, 0, i as u64, &data)
    });
    let ranges = builder.ranges().to_vec();
    (builder.build(), ranges)
}

/// A TFRecord container of `count` classification examples whose encoded
/// image field holds `size` bytes.
pub fn tfrecord_container(count: usize, size: usize) -> Vec<u8> {
    let data = payload(size);
    (0..count)
        .fold(TfRecordBuilder::new(), |builder, i| {
            let example = classification_example(i as i64, (i % 10) as i64, &data, "cifar", 32, 32);
            builder.example(&example.build())
        })
        .build()
}
