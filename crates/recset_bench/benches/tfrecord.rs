//! TFRecord read benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recset_bench::tfrecord_container;
use recset_codec::FeatureRecord;
use recset_core::{tfrecord::image_record_from_features, StandardImageDecoder, TfRecordReader};
use recset_storage::InMemoryBackend;

const RECORDS: usize = 500;

/// Frame scan with and without CRC verification.
fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("tfrecord_frames");
    let bytes = tfrecord_container(RECORDS, 3072);
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    for verify in [true, false] {
        let name = if verify { "crc" } else { "no_crc" };
        group.bench_with_input(BenchmarkId::from_parameter(name), &bytes, |b, bytes| {
            b.iter(|| {
                let mut reader =
                    TfRecordReader::new(InMemoryBackend::with_data(bytes.clone())).verify_crc(verify);
                while let Some(frame) = reader.next_frame().unwrap() {
                    black_box(frame);
                }
            });
        });
    }

    group.finish();
}

/// Example decoding and planar image conversion.
fn bench_examples(c: &mut Criterion) {
    let mut group = c.benchmark_group("tfrecord_examples");
    let bytes = tfrecord_container(1, 3072);
    let frame = TfRecordReader::new(InMemoryBackend::with_data(bytes))
        .next_frame()
        .unwrap()
        .unwrap();

    group.bench_function("decode_example", |b| {
        b.iter(|| {
            let features = FeatureRecord::decode(black_box(&frame)).unwrap();
            black_box(features);
        });
    });

    let features = FeatureRecord::decode(&frame).unwrap();
    group.bench_function("planar_image", |b| {
        b.iter(|| {
            let image = image_record_from_features(black_box(&features), &StandardImageDecoder);
            black_box(image.unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_frames, bench_examples);
criterion_main!(benches);
