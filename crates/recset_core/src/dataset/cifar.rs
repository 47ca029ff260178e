//! CIFAR-10 and CIFAR-100 in their binary batch format.

use super::fetch::{ensure_extracted, require_file, RemoteFile};
use super::{resolve_label, Dataset, DatasetContext, VISION};
use crate::cifar::{CifarLayout, CifarReader, CifarRecord};
use crate::error::{CoreError, CoreResult};
use crate::record::{ImageRecord, LabeledData, LabeledImage};
use recset_storage::FileBackend;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const BASE_URL: &str = "https://www.cs.toronto.edu/~kriz";

/// Batch files of one split.
#[derive(Debug, Clone)]
struct Split {
    name: &'static str,
    files: Vec<String>,
}

#[derive(Debug, Default)]
struct Cursor {
    batch: usize,
    split: &'static str,
    id: u64,
    reader: Option<CifarReader<FileBackend>>,
}

/// Images from CIFAR batch files, addressed as `split/index`.
///
/// The batches arrive as one archive that is unpacked through the
/// context's [`Unarchiver`](super::Unarchiver). Indexes count from zero
/// across all batch files of a split, so `train/10000` is the first record
/// of the second CIFAR-10 training batch. `next` walks the splits in
/// [`list`](Dataset::list) order.
pub struct CifarDataset {
    name: String,
    dir: PathBuf,
    ctx: DatasetContext,
    layout: CifarLayout,
    archive: RemoteFile,
    folder: String,
    splits: Vec<Split>,
    label_file: String,
    coarse_label_file: Option<String>,
    labels: Option<Vec<String>>,
    coarse_labels: Option<Vec<String>>,
    cursor: Option<Cursor>,
}

impl CifarDataset {
    /// CIFAR-10: five training batches and one test batch.
    #[must_use]
    pub fn cifar10(ctx: &DatasetContext) -> Self {
        let train = (1..=5).map(|i| format!("data_batch_{i}.bin")).collect();
        Self::new(
            ctx,
            "cifar10",
            CifarLayout::Cifar10,
            "cifar-10-binary.tar.gz",
            "cifar-10-batches-bin",
            vec![
                Split {
                    name: "train",
                    files: train,
                },
                Split {
                    name: "test",
                    files: vec!["test_batch.bin".to_string()],
                },
            ],
            "batches.meta.txt",
            None,
        )
    }

    /// CIFAR-100: fine labels with their coarse superclasses.
    #[must_use]
    pub fn cifar100(ctx: &DatasetContext) -> Self {
        Self::new(
            ctx,
            "cifar100",
            CifarLayout::Cifar100,
            "cifar-100-binary.tar.gz",
            "cifar-100-binary",
            vec![
                Split {
                    name: "train",
                    files: vec!["train.bin".to_string()],
                },
                Split {
                    name: "test",
                    files: vec!["test.bin".to_string()],
                },
            ],
            "fine_label_names.txt",
            Some("coarse_label_names.txt"),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        ctx: &DatasetContext,
        name: &str,
        layout: CifarLayout,
        archive: &str,
        folder: &str,
        splits: Vec<Split>,
        label_file: &str,
        coarse_label_file: Option<&str>,
    ) -> Self {
        Self {
            name: name.to_string(),
            dir: ctx.dataset_dir(VISION, name),
            ctx: ctx.clone(),
            layout,
            archive: RemoteFile::new(BASE_URL, archive),
            folder: folder.to_string(),
            splits,
            label_file: label_file.to_string(),
            coarse_label_file: coarse_label_file.map(str::to_string),
            labels: None,
            coarse_labels: None,
            cursor: None,
        }
    }

    /// Sets the expected digest of the archive.
    #[must_use]
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.archive = self.archive.with_checksum(checksum);
        self
    }

    /// Record layout of the batch files.
    #[must_use]
    pub fn layout(&self) -> CifarLayout {
        self.layout
    }

    fn members(&self) -> Vec<&str> {
        self.splits
            .iter()
            .flat_map(|split| split.files.iter().map(String::as_str))
            .chain(Some(self.label_file.as_str()))
            .chain(self.coarse_label_file.as_deref())
            .collect()
    }

    fn open_batch(&self, file: &str) -> CoreResult<CifarReader<FileBackend>> {
        let path = require_file(&self.dir, file)?;
        CifarReader::open(path, self.layout)
    }

    fn load_labels(&mut self) -> CoreResult<()> {
        if self.labels.is_none() {
            self.labels = Some(read_labels(&self.dir, &self.label_file)?);
        }
        if self.coarse_labels.is_none() {
            if let Some(file) = &self.coarse_label_file {
                self.coarse_labels = Some(read_labels(&self.dir, file)?);
            }
        }
        Ok(())
    }

    fn labeled(&mut self, record: CifarRecord, id: u64) -> CoreResult<LabeledData> {
        self.load_labels()?;
        let image = record.image()?;
        let fine = self.labels.as_deref().unwrap_or_default();
        let coarse = self.coarse_labels.as_deref().unwrap_or_default();
        Ok(LabeledData::Image(LabeledImage {
            label: resolve_label(fine, f32::from(record.label)),
            coarse_label: record
                .coarse_label
                .map(|c| resolve_label(coarse, f32::from(c))),
            record: ImageRecord {
                id,
                label_index: f32::from(record.label),
                image,
            },
        }))
    }
}

fn read_labels(dir: &Path, file: &str) -> CoreResult<Vec<String>> {
    let path = require_file(dir, file)?;
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

// (split, file) of the n-th batch across all splits.
fn batch_at(splits: &[Split], n: usize) -> Option<(&'static str, &str)> {
    splits
        .iter()
        .flat_map(|split| split.files.iter().map(move |f| (split.name, f.as_str())))
        .nth(n)
}

impl Dataset for CifarDataset {
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
        let members = self.members();
        ensure_extracted(&self.ctx, &self.dir, &self.archive, &self.folder, &members)
    }

    fn list(&mut self) -> CoreResult<Vec<String>> {
        let mut names = Vec::new();
        for split in &self.splits {
            let mut count = 0;
            for file in &split.files {
                count += self.open_batch(file)?.len()?;
            }
            names.extend((0..count).map(|i| format!("{}/{i}", split.name)));
        }
        Ok(names)
    }

    fn load(&mut self) -> CoreResult<()> {
        self.load_labels()?;
        self.cursor = Some(Cursor::default());
        debug!(dataset = %self.name, "opened batch stream");
        Ok(())
    }

    fn get(&mut self, name: &str) -> CoreResult<LabeledData> {
        let (split_name, index) = name
            .split_once('/')
            .and_then(|(split, index)| Some((split, index.parse::<u64>().ok()?)))
            .ok_or_else(|| CoreError::not_found(name))?;
        let split = self
            .splits
            .iter()
            .find(|split| split.name == split_name)
            .ok_or_else(|| CoreError::not_found(name))?;

        let mut remaining = index;
        let mut found = None;
        for file in &split.files {
            let reader = self.open_batch(file)?;
            let len = reader.len()?;
            if remaining < len {
                found = Some(reader.get(remaining)?);
                break;
            }
            remaining -= len;
        }

        match found {
            Some(record) => self.labeled(record, index),
            None => Err(CoreError::not_found(name)),
        }
    }

    fn next(&mut self) -> CoreResult<Option<LabeledData>> {
        if self.cursor.is_none() {
            self.load()?;
        }
        loop {
            let Some(cursor) = self.cursor.as_mut() else {
                return Ok(None);
            };
            if cursor.reader.is_none() {
                let Some((split, file)) = batch_at(&self.splits, cursor.batch) else {
                    return Ok(None);
                };
                let path = require_file(&self.dir, file)?;
                cursor.reader = Some(CifarReader::open(path, self.layout)?);
                if cursor.split != split {
                    cursor.split = split;
                    cursor.id = 0;
                }
            }
            let Some(reader) = cursor.reader.as_mut() else {
                return Ok(None);
            };
            match reader.next_record()? {
                Some(record) => {
                    let id = cursor.id;
                    cursor.id += 1;
                    return self.labeled(record, id).map(Some);
                }
                None => {
                    reader.close()?;
                    cursor.reader = None;
                    cursor.batch += 1;
                }
            }
        }
    }

    fn close(&mut self) -> CoreResult<()> {
        if let Some(mut reader) = self.cursor.take().and_then(|c| c.reader) {
            reader.close()?;
        }
        Ok(())
    }
}
