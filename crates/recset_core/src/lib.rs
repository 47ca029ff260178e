//! # recset Core
//!
//! Record-container decoding for labeled image datasets.
//!
//! This crate provides:
//! - RecordIO decoding with bounds-checked framing
//! - TFRecord frame reading with CRC-32C verification
//! - CIFAR binary batches with sequential and positional reads
//! - Random-access indexes built from listing files
//! - Object-detection annotations assembled from `Example` features
//! - Dataset adapters, collaborators for download and checksums, and an
//!   explicit registry
//!
//! ## Example
//!
//! ```rust,no_run
//! use recset_core::{RecordIoReader, StandardImageDecoder};
//!
//! let mut reader = RecordIoReader::open("imagenet1k-val.rec")?;
//! while let Some(record) = reader.next_record(&StandardImageDecoder)? {
//!     println!("{} {} {:?}", record.id, record.label_index, record.image.dimensions());
//! }
//! reader.close()?;
//! # Ok::<(), recset_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod annotation;
pub mod cifar;
mod config;
pub mod dataset;
mod error;
mod index;
pub mod raster;
mod record;
pub mod recordio;
pub mod tfrecord;

pub use annotation::{BoundingBox, DetectionRecord, ImageMetadata};
pub use config::{Config, WORKING_DIRECTORY_ENV};
pub use cifar::{CifarLayout, CifarReader, CifarRecord};
pub use dataset::{
    register_builtin, ChecksumVerifier, CifarDataset, Dataset, DatasetContext, DatasetRegistry,
    DetectionDataset, Fetcher, ImageTfRecordDataset, RecordIoDataset, Sha256Verifier, Unarchiver,
};
pub use error::{CoreError, CoreResult};
pub use index::{RecordIndex, RecordRange};
pub use raster::{ImageDecoder, RgbImage, StandardImageDecoder};
pub use record::{DetectionImage, ImageRecord, ImageSegmentationRecord, LabeledData, LabeledImage};
pub use recordio::{RawRecord, RecordHeader, RecordIoReader};
pub use tfrecord::TfRecordReader;

pub use recset_codec::{FeatureKind, FeatureRecord, FeatureValue};
pub use recset_storage::{FileBackend, InMemoryBackend, RangeBackend, StorageBackend, StorageError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
