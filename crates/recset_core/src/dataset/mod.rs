//! Dataset adapters.
//!
//! A [`Dataset`] ties a named collection of container files to one of the
//! readers in this crate. Adapters are created through a
//! [`DatasetRegistry`] from a shared [`DatasetContext`], which carries the
//! configuration and the external collaborators (fetcher, checksum
//! verifier, unarchiver, image decoder).
//!
//! ## Lifecycle
//!
//! 1. `download` makes sure every file is present in `working_dir`
//! 2. `load` opens the container for sequential reading
//! 3. `next` yields records until `Ok(None)`
//! 4. `close` releases file handles
//!
//! `list` and `get` offer random access where the container supports it.

mod builtin;
mod cifar;
mod classification;
mod detection;
mod fetch;
mod imagenet;
mod registry;

pub use builtin::register_builtin;
pub use cifar::CifarDataset;
pub use classification::ImageTfRecordDataset;
pub use detection::DetectionDataset;
pub use fetch::{
    ensure_extracted, ensure_file, require_file, ChecksumVerifier, Fetcher, RemoteFile,
    Sha256Verifier, Unarchiver,
};
pub use imagenet::RecordIoDataset;
pub use registry::{DatasetFactory, DatasetRegistry};

use crate::config::Config;
use crate::error::CoreResult;
use crate::raster::{ImageDecoder, StandardImageDecoder};
use crate::record::LabeledData;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Category shared by all image datasets.
pub const VISION: &str = "vision";

/// Returns the lowercase `category/name` key of a dataset.
#[must_use]
pub fn canonical_name(category: &str, name: &str) -> String {
    format!("{}/{}", category.to_lowercase(), name.to_lowercase())
}

/// Text for a numeric class label.
///
/// Integral indexes inside `labels` map to their entry; anything else is
/// rendered as the number itself.
pub(crate) fn resolve_label(labels: &[String], index: f32) -> String {
    if index >= 0.0 && index.fract() == 0.0 {
        if let Some(label) = labels.get(index as usize) {
            return label.clone();
        }
    }
    index.to_string()
}

/// A named, downloadable collection of labeled records.
pub trait Dataset: Send {
    /// Category, e.g. `vision`.
    fn category(&self) -> &str;

    /// Dataset name within its category.
    fn name(&self) -> &str;

    /// Lowercase `category/name`.
    fn canonical_name(&self) -> String {
        canonical_name(self.category(), self.name())
    }

    /// Directory holding the dataset files.
    fn working_dir(&self) -> PathBuf;

    /// Fetches missing files into [`working_dir`](Self::working_dir).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingFile`](crate::CoreError::MissingFile) when
    /// a file is absent and no fetcher is configured, or the fetcher's and
    /// verifier's errors.
    fn download(&mut self) -> CoreResult<()>;

    /// Names of the records available for [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Unsupported`](crate::CoreError::Unsupported) if
    /// the container has no index.
    fn list(&mut self) -> CoreResult<Vec<String>>;

    /// Opens the container for [`next`](Self::next).
    ///
    /// # Errors
    ///
    /// Returns an error if the container file is missing or unreadable.
    fn load(&mut self) -> CoreResult<()>;

    /// Reads one record by name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`](crate::CoreError::NotFound) for an
    /// unknown name, or
    /// [`CoreError::Unsupported`](crate::CoreError::Unsupported) if the
    /// container has no index.
    fn get(&mut self, name: &str) -> CoreResult<LabeledData>;

    /// Reads the next record, or `Ok(None)` at the end.
    ///
    /// Calls [`load`](Self::load) first if needed.
    ///
    /// # Errors
    ///
    /// Returns the reader's decoding errors.
    fn next(&mut self) -> CoreResult<Option<LabeledData>>;

    /// Releases open files. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend fails to close.
    fn close(&mut self) -> CoreResult<()>;
}

/// Configuration and collaborators handed to dataset factories.
#[derive(Clone)]
pub struct DatasetContext {
    /// Reader and directory settings.
    pub config: Config,
    /// Downloads missing files; `None` means offline.
    pub fetcher: Option<Arc<dyn Fetcher>>,
    /// Checks downloaded files; `None` skips verification.
    pub verifier: Option<Arc<dyn ChecksumVerifier>>,
    /// Unpacks downloaded archives; `None` means archived datasets must be
    /// extracted by hand.
    pub unarchiver: Option<Arc<dyn Unarchiver>>,
    /// Decodes image payloads.
    pub decoder: Arc<dyn ImageDecoder + Send + Sync>,
}

impl DatasetContext {
    /// Creates an offline context with the standard decoder.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            fetcher: None,
            verifier: None,
            unarchiver: None,
            decoder: Arc::new(StandardImageDecoder),
        }
    }

    /// Sets the fetcher.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Sets the checksum verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn ChecksumVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Sets the archive extractor.
    #[must_use]
    pub fn with_unarchiver(mut self, unarchiver: Arc<dyn Unarchiver>) -> Self {
        self.unarchiver = Some(unarchiver);
        self
    }

    /// Sets the image decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn ImageDecoder + Send + Sync>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Working directory of the dataset `category/name`.
    #[must_use]
    pub fn dataset_dir(&self, category: &str, name: &str) -> PathBuf {
        self.config
            .working_directory
            .join(category.to_lowercase())
            .join(name.to_lowercase())
    }
}

impl Default for DatasetContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for DatasetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetContext")
            .field("config", &self.config)
            .field("fetcher", &self.fetcher.is_some())
            .field("verifier", &self.verifier.is_some())
            .field("unarchiver", &self.unarchiver.is_some())
            .finish_non_exhaustive()
    }
}
