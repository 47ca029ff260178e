//! ImageNet-style RecordIO datasets with a listing index.

use super::fetch::{ensure_file, require_file, RemoteFile};
use super::{resolve_label, Dataset, DatasetContext, VISION};
use crate::error::{CoreError, CoreResult};
use crate::index::RecordIndex;
use crate::record::{ImageRecord, LabeledData, LabeledImage};
use crate::recordio::RecordIoReader;
use recset_storage::{FileBackend, RangeBackend, StorageBackend};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Listing file of the ILSVRC2012 validation set.
pub const LISTING_FILE: &str = "imagenet1k-val.lst";

/// Record file of the ILSVRC2012 validation set.
pub const RECORD_FILE: &str = "imagenet1k-val.rec";

/// Optional label table, one class name per line.
pub const SYNSET_FILE: &str = "synset.txt";

/// A RecordIO data file plus its listing.
///
/// Sequential reads stream the whole data file. Random access through
/// [`get`](Dataset::get) builds the index on first use and reads each record
/// through a [`RangeBackend`] window over the shared data file.
pub struct RecordIoDataset {
    name: String,
    dir: PathBuf,
    ctx: DatasetContext,
    listing: RemoteFile,
    records: RemoteFile,
    index: Option<RecordIndex>,
    labels: Option<Vec<String>>,
    data: Option<Arc<FileBackend>>,
    reader: Option<RecordIoReader<Arc<FileBackend>>>,
}

impl RecordIoDataset {
    /// Creates an adapter for `name` whose files live under `base_url`.
    #[must_use]
    pub fn new(ctx: &DatasetContext, name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            dir: ctx.dataset_dir(VISION, name),
            ctx: ctx.clone(),
            listing: RemoteFile::new(base_url, LISTING_FILE),
            records: RemoteFile::new(base_url, RECORD_FILE),
            index: None,
            labels: None,
            data: None,
            reader: None,
        }
    }

    /// ILSVRC2012 validation images at the given edge size, or at their
    /// native size for `None`.
    #[must_use]
    pub fn ilsvrc2012_validation(ctx: &DatasetContext, size: Option<u32>) -> Self {
        const BASE_URL: &str = "https://s3.amazonaws.com/store.carml.org/datasets";
        match size {
            Some(size) => Self::new(
                ctx,
                &format!("ilsvrc2012_validation_{size}"),
                &format!("{BASE_URL}/ILSVRC2012_img_val_{size}"),
            ),
            None => Self::new(
                ctx,
                "ilsvrc2012_validation",
                &format!("{BASE_URL}/ILSVRC2012_img_val_256"),
            ),
        }
    }

    /// The record index, built from the listing file on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingFile`] if the listing was not downloaded,
    /// or the listing's parse error.
    pub fn index(&mut self) -> CoreResult<&RecordIndex> {
        if self.index.is_none() {
            let path = require_file(&self.dir, &self.listing.name)?;
            self.index = Some(RecordIndex::build(path)?);
        }
        match &self.index {
            Some(index) => Ok(index),
            None => Err(CoreError::invalid_operation("record index unavailable")),
        }
    }

    fn data(&mut self) -> CoreResult<Arc<FileBackend>> {
        if let Some(data) = &self.data {
            return Ok(Arc::clone(data));
        }
        let path = require_file(&self.dir, &self.records.name)?;
        let data = Arc::new(FileBackend::open(&path)?);
        self.data = Some(Arc::clone(&data));
        Ok(data)
    }

    fn label(&mut self, index: f32) -> CoreResult<String> {
        if self.labels.is_none() {
            let path = self.dir.join(SYNSET_FILE);
            let labels = if path.is_file() {
                fs::read_to_string(&path)?
                    .lines()
                    .map(|line| line.trim().to_string())
                    .collect()
            } else {
                Vec::new()
            };
            debug!(dataset = %self.name, labels = labels.len(), "loaded label table");
            self.labels = Some(labels);
        }
        Ok(resolve_label(self.labels.as_deref().unwrap_or_default(), index))
    }

    fn labeled(&mut self, record: ImageRecord) -> CoreResult<LabeledData> {
        let label = self.label(record.label_index)?;
        Ok(LabeledData::Image(LabeledImage {
            label,
            coarse_label: None,
            record,
        }))
    }
}

impl Dataset for RecordIoDataset {
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
        ensure_file(&self.ctx, &self.dir, &self.listing)?;
        ensure_file(&self.ctx, &self.dir, &self.records)?;
        self.index()?;
        Ok(())
    }

    fn list(&mut self) -> CoreResult<Vec<String>> {
        Ok(self.index()?.list().to_vec())
    }

    fn load(&mut self) -> CoreResult<()> {
        let data = self.data()?;
        self.reader =
            Some(RecordIoReader::new(data).strict_padding(self.ctx.config.strict_padding));
        debug!(dataset = %self.name, "opened record stream");
        Ok(())
    }

    fn get(&mut self, name: &str) -> CoreResult<LabeledData> {
        let range = self.index()?.lookup(name)?;
        let window = RangeBackend::new(self.data()?, range.start, range.end)?;
        let mut reader =
            RecordIoReader::new(window).strict_padding(self.ctx.config.strict_padding);
        let record = reader
            .next_record(&*self.ctx.decoder)?
            .ok_or_else(|| CoreError::malformed(format!("record {name} has an empty range")))?;
        self.labeled(record)
    }

    fn next(&mut self) -> CoreResult<Option<LabeledData>> {
        if self.reader.is_none() {
            self.load()?;
        }
        let decoder = Arc::clone(&self.ctx.decoder);
        let record = match self.reader.as_mut() {
            Some(reader) => reader.next_record(&*decoder)?,
            None => None,
        };
        record.map(|r| self.labeled(r)).transpose()
    }

    fn close(&mut self) -> CoreResult<()> {
        // The stream reader borrows the shared data file; closing that once
        // releases both.
        self.reader = None;
        if let Some(data) = self.data.take() {
            data.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use recset_testkit::prelude::*;

    fn dataset(dir: &TestDir) -> RecordIoDataset {
        let ctx = DatasetContext::new(Config::new().working_directory(dir.path()));
        RecordIoDataset::new(&ctx, "tiny_val", "https://host/tiny")
    }

    fn populate(dir: &TestDir) -> Vec<String> {
        let builder = RecordIoBuilder::new()
            .record(0.0, 0, 1, &rgb_png(3, 2))
            .record(2.0, 0, 2, &rgb_png(4, 4))
            .record(1.0, 0, 3, &rgb_png(2, 5));
        let names = ["a.png", "b.png", "c.png"];
        let listing = builder.listing(&names);
        dir.write(format!("vision/tiny_val/{LISTING_FILE}"), listing);
        dir.write(format!("vision/tiny_val/{RECORD_FILE}"), builder.build());
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn names_and_directory() {
        with_test_dir(|dir| {
            let ds = dataset(dir);
            assert_eq!(ds.canonical_name(), "vision/tiny_val");
            assert_eq!(ds.working_dir(), dir.path().join("vision").join("tiny_val"));
        });
    }

    #[test]
    fn builtin_names() {
        let ctx = DatasetContext::default();
        assert_eq!(
            RecordIoDataset::ilsvrc2012_validation(&ctx, None).name(),
            "ilsvrc2012_validation"
        );
        assert_eq!(
            RecordIoDataset::ilsvrc2012_validation(&ctx, Some(224)).name(),
            "ilsvrc2012_validation_224"
        );
    }

    #[test]
    fn streams_all_records() {
        with_test_dir(|dir| {
            populate(dir);
            let mut ds = dataset(dir);
            let mut ids = Vec::new();
            while let Some(data) = ds.next().unwrap() {
                match data {
                    LabeledData::Image(img) => ids.push(img.record.id),
                    LabeledData::Detection(_) => panic!("unexpected detection"),
                }
            }
            assert_eq!(ids, vec![1, 2, 3]);
            assert!(ds.next().unwrap().is_none());
            ds.close().unwrap();
            ds.close().unwrap();
        });
    }

    #[test]
    fn close_releases_data_file_and_reopens() {
        with_test_dir(|dir| {
            populate(dir);
            let mut ds = dataset(dir);
            assert!(ds.next().unwrap().is_some());
            let data = ds.data.clone().unwrap();
            assert!(ds.get("c.png").is_ok());

            ds.close().unwrap();
            assert!(ds.reader.is_none());
            assert!(ds.data.is_none());
            assert!(matches!(
                data.read_at(0, 4),
                Err(recset_storage::StorageError::Closed)
            ));

            // a closed dataset starts over on the next read
            let data = ds.next().unwrap().unwrap();
            assert_eq!(data.image(), &rgb_image(3, 2));
            ds.close().unwrap();
        });
    }

    #[test]
    fn get_by_name_reads_one_record() {
        with_test_dir(|dir| {
            let names = populate(dir);
            let mut ds = dataset(dir);
            assert_eq!(ds.list().unwrap(), names);

            let data = ds.get("b.png").unwrap();
            assert_eq!(data.image(), &rgb_image(4, 4));
            assert_eq!(data.label(), Some("2"));

            assert!(matches!(ds.get("zzz.png"), Err(CoreError::NotFound { .. })));
        });
    }

    #[test]
    fn labels_from_synset() {
        with_test_dir(|dir| {
            populate(dir);
            dir.write(
                format!("vision/tiny_val/{SYNSET_FILE}"),
                "n01440764 tench\nn01443537 goldfish\nn01484850 great white shark\n",
            );
            let mut ds = dataset(dir);
            assert_eq!(ds.get("a.png").unwrap().label(), Some("n01440764 tench"));
            assert_eq!(
                ds.get("b.png").unwrap().label(),
                Some("n01484850 great white shark")
            );
        });
    }

    #[test]
    fn download_offline_requires_files() {
        with_test_dir(|dir| {
            let mut ds = dataset(dir);
            assert!(matches!(ds.download(), Err(CoreError::MissingFile { .. })));

            populate(dir);
            ds.download().unwrap();
            assert_eq!(ds.index().unwrap().len(), 3);
        });
    }
}
