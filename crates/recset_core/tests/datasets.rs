//! Integration tests for dataset adapters through the registry.

use recset_core::{
    register_builtin, Config, CoreError, CoreResult, DatasetContext, DatasetRegistry, Fetcher,
    LabeledData, RecordIoReader, Sha256Verifier, StandardImageDecoder, TfRecordReader,
};
use recset_testkit::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Serves files from memory, keyed by the last URL segment.
#[derive(Default)]
struct MirrorFetcher {
    files: HashMap<String, Vec<u8>>,
    fetched: Mutex<Vec<String>>,
}

impl MirrorFetcher {
    fn with_file(mut self, name: &str, contents: Vec<u8>) -> Self {
        self.files.insert(name.to_string(), contents);
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl Fetcher for MirrorFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> CoreResult<()> {
        let name = url.rsplit('/').next().unwrap_or(url);
        let contents = self
            .files
            .get(name)
            .ok_or_else(|| CoreError::download(format!("404 for {url}")))?;
        fs::write(dest, contents)?;
        self.fetched.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn registry() -> DatasetRegistry {
    let mut registry = DatasetRegistry::new();
    register_builtin(&mut registry).unwrap();
    registry
}

fn imagenet_files() -> (Vec<u8>, String) {
    let builder = RecordIoBuilder::new()
        .push(&validation_record())
        .record(1.0, 0, 16504, &rgb_png(5, 5))
        .record(2.0, 0, 16505, &rgb_png(7, 3));
    let listing = builder.listing(&[
        "ILSVRC2012_val_00000001.JPEG",
        "ILSVRC2012_val_00000002.JPEG",
        "ILSVRC2012_val_00000003.JPEG",
    ]);
    (builder.build(), listing)
}

#[test]
fn imagenet_download_list_get_next() {
    with_test_dir(|dir| {
        let (records, listing) = imagenet_files();
        let fetcher = Arc::new(
            MirrorFetcher::default()
                .with_file("imagenet1k-val.rec", records)
                .with_file("imagenet1k-val.lst", listing.into_bytes()),
        );
        let ctx = DatasetContext::new(Config::new().working_directory(dir.path()))
            .with_fetcher(fetcher.clone());

        let mut dataset = registry()
            .get("vision", "ILSVRC2012_validation_224", &ctx)
            .unwrap();
        dataset.download().unwrap();
        assert_eq!(fetcher.fetched().len(), 2);
        assert!(fetcher.fetched()[0].contains("ILSVRC2012_img_val_224"));

        let names = dataset.list().unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], "ILSVRC2012_val_00000001.JPEG");

        let first = dataset.get(&names[0]).unwrap();
        let LabeledData::Image(image) = &first else {
            panic!("expected an image");
        };
        assert_eq!(image.record.id, VALIDATION_ID1);
        assert_eq!(image.record.label_index, VALIDATION_LABEL);
        assert_eq!(image.label, "577");
        assert_eq!(image.record.image.dimensions(), (8, 6));

        let mut ids = Vec::new();
        while let Some(LabeledData::Image(image)) = dataset.next().unwrap() {
            ids.push(image.record.id);
        }
        assert_eq!(ids, vec![VALIDATION_ID1, 16504, 16505]);
        dataset.close().unwrap();

        // Files on disk are reused.
        let mut again = registry()
            .get("vision", "ilsvrc2012_validation_224", &ctx)
            .unwrap();
        again.download().unwrap();
        assert_eq!(fetcher.fetched().len(), 2);
    });
}

#[test]
fn sequential_and_indexed_reads_agree() {
    with_test_dir(|dir| {
        let (records, listing) = imagenet_files();
        let data_dir = dir.path().join("vision").join("ilsvrc2012_validation");
        dir.write("vision/ilsvrc2012_validation/imagenet1k-val.rec", &records);
        dir.write("vision/ilsvrc2012_validation/imagenet1k-val.lst", &listing);

        let ctx = DatasetContext::new(Config::new().working_directory(dir.path()));
        let mut dataset = registry()
            .get_by_key("vision/ilsvrc2012_validation", &ctx)
            .unwrap();
        assert_eq!(dataset.working_dir(), data_dir);

        let mut reader = RecordIoReader::open(data_dir.join("imagenet1k-val.rec")).unwrap();
        for name in dataset.list().unwrap() {
            let indexed = dataset.get(&name).unwrap();
            let streamed = reader.next_record(&StandardImageDecoder).unwrap().unwrap();
            assert_eq!(indexed.image(), &streamed.image);
        }
        assert!(reader.next_raw().unwrap().is_none());
        reader.close().unwrap();
    });
}

#[test]
fn detection_dataset_end_to_end() {
    with_test_dir(|dir| {
        let png = rgb_png(10, 8);
        let example = detection_example(
            "2008_000008.jpg",
            &png,
            10,
            8,
            &[BoxSpec::new(0.05, 0.95, 0.1, 0.9, "horse", 13)],
        )
        .int64s("image/object/difficult", &[0])
        .int64s("image/object/truncated", &[1])
        .strings("image/object/view", &["Left"]);
        let stream = TfRecordBuilder::new().example(&example.build()).build();

        let digest = {
            let path = dir.write("mirror/validation.tfrecord", &stream);
            Sha256Verifier::digest_file(&path).unwrap()
        };
        assert_eq!(digest.len(), 64);

        let ctx = DatasetContext::new(Config::new().working_directory(dir.path().join("work")))
            .with_fetcher(Arc::new(
                MirrorFetcher::default().with_file("validation.tfrecord", stream.clone()),
            ))
            .with_verifier(Arc::new(Sha256Verifier));

        let mut dataset = registry().get("vision", "pascal2012", &ctx).unwrap();
        dataset.download().unwrap();
        assert!(matches!(dataset.list(), Err(CoreError::Unsupported { .. })));

        let Some(LabeledData::Detection(det)) = dataset.next().unwrap() else {
            panic!("expected a detection");
        };
        assert_eq!(det.metadata.file_name, "2008_000008.jpg");
        assert_eq!(det.image.dimensions(), (10, 8));
        let horse = &det.boxes[0];
        assert_eq!(horse.label, "horse");
        assert_eq!(horse.class_index, Some(13));
        assert_eq!(horse.difficult, Some(false));
        assert_eq!(horse.truncated, Some(true));
        assert_eq!(horse.pose.as_deref(), Some("Left"));
        assert!(dataset.next().unwrap().is_none());
        dataset.close().unwrap();

        let mut reader = TfRecordReader::open(dataset.working_dir().join("validation.tfrecord"))
            .unwrap();
        let features = reader.next_example().unwrap().unwrap();
        assert_eq!(features.get_string("image/filename"), "2008_000008.jpg");
    });
}

#[test]
fn missing_files_without_fetcher() {
    with_test_dir(|dir| {
        let ctx = DatasetContext::new(Config::new().working_directory(dir.path()));
        let registry = registry();
        for key in registry.names() {
            let mut dataset = registry.get_by_key(&key, &ctx).unwrap();
            assert!(
                matches!(dataset.download(), Err(CoreError::MissingFile { .. })),
                "{key}"
            );
            assert!(dataset.next().is_err(), "{key}");
        }
    });
}

#[test]
fn fetch_failure_is_reported() {
    with_test_dir(|dir| {
        let ctx = DatasetContext::new(Config::new().working_directory(dir.path()))
            .with_fetcher(Arc::new(MirrorFetcher::default()));
        let mut dataset = registry().get("vision", "coco2017", &ctx).unwrap();
        assert!(matches!(dataset.download(), Err(CoreError::Download { .. })));
    });
}
