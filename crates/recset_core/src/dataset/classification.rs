//! Image-classification datasets stored as one TFRecord file.

use super::fetch::{ensure_file, require_file, RemoteFile};
use super::{resolve_label, Dataset, DatasetContext, VISION};
use crate::error::{CoreError, CoreResult};
use crate::record::{LabeledData, LabeledImage};
use crate::tfrecord::TfRecordReader;
use recset_storage::FileBackend;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Classified images read sequentially from a TFRecord file.
///
/// Records follow the image-classification schema of
/// [`tfrecord::keys`](crate::tfrecord::keys); planar `cifar` payloads and
/// encoded images are both accepted.
pub struct ImageTfRecordDataset {
    name: String,
    dir: PathBuf,
    ctx: DatasetContext,
    file: RemoteFile,
    labels: Vec<String>,
    reader: Option<TfRecordReader<FileBackend>>,
}

impl ImageTfRecordDataset {
    /// Creates an adapter for `name` reading `base_url/file_name`.
    #[must_use]
    pub fn new(ctx: &DatasetContext, name: &str, base_url: &str, file_name: &str) -> Self {
        Self {
            name: name.to_string(),
            dir: ctx.dataset_dir(VISION, name),
            ctx: ctx.clone(),
            file: RemoteFile::new(base_url, file_name),
            labels: Vec::new(),
            reader: None,
        }
    }

    /// Sets the class names used for labels.
    #[must_use]
    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Sets the expected digest of the record file.
    #[must_use]
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.file = self.file.with_checksum(checksum);
        self
    }

    fn unsupported(&self, op: &str) -> CoreError {
        CoreError::unsupported(format!("{op} is not supported for {}", self.canonical_name()))
    }
}

impl Dataset for ImageTfRecordDataset {
    fn category(&self) -> &str {
        VISION
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn working_dir(&self) -> PathBuf {
        self.dir.clone()
    }

    fn download(&mut self) -> CoreResult<()> {
        ensure_file(&self.ctx, &self.dir, &self.file)?;
        Ok(())
    }

    fn list(&mut self) -> CoreResult<Vec<String>> {
        Err(self.unsupported("list"))
    }

    fn load(&mut self) -> CoreResult<()> {
        let path = require_file(&self.dir, &self.file.name)?;
        self.reader = Some(TfRecordReader::open(&path)?.verify_crc(self.ctx.config.verify_crc));
        debug!(dataset = %self.name, path = %path.display(), "opened image records");
        Ok(())
    }

    fn get(&mut self, _name: &str) -> CoreResult<LabeledData> {
        Err(self.unsupported("get"))
    }

    fn next(&mut self) -> CoreResult<Option<LabeledData>> {
        if self.reader.is_none() {
            self.load()?;
        }
        let decoder = Arc::clone(&self.ctx.decoder);
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        Ok(reader.next_image(&*decoder)?.map(|record| {
            LabeledData::Image(LabeledImage {
                label: resolve_label(&self.labels, record.label_index),
                coarse_label: None,
                record,
            })
        }))
    }

    fn close(&mut self) -> CoreResult<()> {
        if let Some(mut reader) = self.reader.take() {
            reader.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use recset_testkit::prelude::*;

    const LABELS: [&str; 4] = ["airplane", "automobile", "bird", "cat"];

    fn dataset(ctx: &DatasetContext) -> ImageTfRecordDataset {
        ImageTfRecordDataset::new(ctx, "tiny_images", "https://host/tiny", "validation.tfrecord")
            .with_labels(&LABELS)
    }

    fn context(dir: &TestDir) -> DatasetContext {
        DatasetContext::new(Config::new().working_directory(dir.path()))
    }

    #[test]
    fn planar_records() {
        with_test_dir(|dir| {
            let first = rgb_image(32, 32);
            let second = rgb_image(8, 8);
            let stream = TfRecordBuilder::new()
                .example(&classification_example(0, 3, &planar_rgb(&first), "cifar", 32, 32).build())
                .example(&classification_example(1, 12, &planar_rgb(&second), "cifar", 8, 8).build())
                .build();
            dir.write("vision/tiny_images/validation.tfrecord", stream);

            let mut ds = dataset(&context(dir));
            let data = ds.next().unwrap().unwrap();
            assert_eq!(data.label(), Some("cat"));
            assert_eq!(data.image(), &first);

            let data = ds.next().unwrap().unwrap();
            assert_eq!(data.label(), Some("12"));
            assert!(ds.next().unwrap().is_none());
            ds.close().unwrap();
        });
    }

    #[test]
    fn corrupted_frame_fails_unless_unchecked() {
        with_test_dir(|dir| {
            let mut stream = TfRecordBuilder::new()
                .example(&classification_example(0, 1, &rgb_png(2, 2), "png", 2, 2).build())
                .build();
            let last = stream.len() - 1;
            stream[last] ^= 0x01;
            dir.write("vision/tiny_images/validation.tfrecord", stream);

            let mut ds = dataset(&context(dir));
            assert!(matches!(
                ds.next(),
                Err(CoreError::ChecksumMismatch { .. })
            ));

            let ctx = DatasetContext::new(
                Config::new()
                    .working_directory(dir.path())
                    .verify_crc(false),
            );
            let mut ds = dataset(&ctx);
            assert_eq!(ds.next().unwrap().unwrap().label(), Some("automobile"));
        });
    }

    #[test]
    fn list_unsupported() {
        let mut ds = dataset(&DatasetContext::default());
        assert!(matches!(ds.list(), Err(CoreError::Unsupported { .. })));
        assert!(matches!(ds.get("x"), Err(CoreError::Unsupported { .. })));
    }
}
