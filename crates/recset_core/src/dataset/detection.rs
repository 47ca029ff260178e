//! Object-detection datasets stored as one TFRecord file.

use super::fetch::{ensure_file, require_file, RemoteFile};
use super::{Dataset, DatasetContext, VISION};
use crate::annotation::DetectionRecord;
use crate::error::{CoreError, CoreResult};
use crate::record::LabeledData;
use crate::tfrecord::TfRecordReader;
use recset_storage::FileBackend;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Detection examples read sequentially from a TFRecord file.
///
/// The container has no index, so [`list`](Dataset::list) and
/// [`get`](Dataset::get) return [`CoreError::Unsupported`].
pub struct DetectionDataset {
    name: String,
    dir: PathBuf,
    ctx: DatasetContext,
    file: RemoteFile,
    reader: Option<TfRecordReader<FileBackend>>,
}

impl DetectionDataset {
    /// Creates an adapter for `name` reading `base_url/file_name`.
    #[must_use]
    pub fn new(ctx: &DatasetContext, name: &str, base_url: &str, file_name: &str) -> Self {
        Self {
            name: name.to_string(),
            dir: ctx.dataset_dir(VISION, name),
            ctx: ctx.clone(),
            file: RemoteFile::new(base_url, file_name),
            reader: None,
        }
    }

    /// Sets the expected digest of the record file.
    #[must_use]
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.file = self.file.with_checksum(checksum);
        self
    }

    /// Reads the next example without decoding its image.
    ///
    /// # Errors
    ///
    /// Returns framing errors and [`CoreError::AnnotationMismatch`].
    pub fn next_record(&mut self) -> CoreResult<Option<DetectionRecord>> {
        if self.reader.is_none() {
            self.load()?;
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        match reader.next_example()? {
            Some(features) => Ok(Some(DetectionRecord::from_features(&features)?)),
            None => Ok(None),
        }
    }

    fn unsupported(&self, op: &str) -> CoreError {
        CoreError::unsupported(format!("{op} is not supported for {}", self.canonical_name()))
    }
}

impl Dataset for DetectionDataset {
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
        debug!(dataset = %self.name, path = %path.display(), "opened detection records");
        Ok(())
    }

    fn get(&mut self, _name: &str) -> CoreResult<LabeledData> {
        Err(self.unsupported("get"))
    }

    fn next(&mut self) -> CoreResult<Option<LabeledData>> {
        let decoder = Arc::clone(&self.ctx.decoder);
        match self.next_record()? {
            Some(record) => Ok(Some(LabeledData::Detection(record.decode_image(&*decoder)?))),
            None => Ok(None),
        }
    }

    fn close(&mut self) -> CoreResult<()> {
        if let Some(mut reader) = self.reader.take() {
            reader.close()?;
        }
        Ok(())
    }
}
