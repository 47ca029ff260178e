//! CIFAR binary batch files.
//!
//! A batch is a headerless run of fixed-size records:
//!
//! ```text
//! ┌──────────────┬──────────────────┬──────────────────┬──────────────────┐
//! │ label(s)     │ red plane (1024) │ green plane      │ blue plane       │
//! └──────────────┴──────────────────┴──────────────────┴──────────────────┘
//! ```
//!
//! CIFAR-10 stores one label byte. CIFAR-100 stores a coarse label byte
//! followed by a fine label byte. Images are 32x32.

use crate::error::{CoreError, CoreResult};
use crate::raster::{planar_to_rgb, RgbImage};
use recset_storage::{FileBackend, StorageBackend, StorageError};
use std::path::Path;

/// Edge length of every image.
pub const IMAGE_SIDE: u32 = 32;

/// Bytes of planar pixel data per record.
pub const PIXEL_BYTES: usize = 3 * 32 * 32;

/// Record layout of a batch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CifarLayout {
    /// One label byte per record.
    Cifar10,
    /// Coarse and fine label bytes per record.
    Cifar100,
}

impl CifarLayout {
    /// Number of label bytes before the pixels.
    #[must_use]
    pub const fn label_bytes(self) -> usize {
        match self {
            Self::Cifar10 => 1,
            Self::Cifar100 => 2,
        }
    }

    /// Total size of one record.
    #[must_use]
    pub const fn record_size(self) -> usize {
        self.label_bytes() + PIXEL_BYTES
    }
}

/// One record of a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CifarRecord {
    /// Superclass index (CIFAR-100 only).
    pub coarse_label: Option<u8>,
    /// Class index; the fine label for CIFAR-100.
    pub label: u8,
    /// Planar `RRR..GGG..BBB` pixels.
    pub pixels: Vec<u8>,
}

impl CifarRecord {
    fn parse(layout: CifarLayout, bytes: &[u8]) -> Self {
        let (labels, pixels) = bytes.split_at(layout.label_bytes());
        match layout {
            CifarLayout::Cifar10 => Self {
                coarse_label: None,
                label: labels[0],
                pixels: pixels.to_vec(),
            },
            CifarLayout::Cifar100 => Self {
                coarse_label: Some(labels[0]),
                label: labels[1],
                pixels: pixels.to_vec(),
            },
        }
    }

    /// Interleaves the pixels into an RGB raster.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ImageDecode`] if the pixel buffer has the wrong
    /// size.
    pub fn image(&self) -> CoreResult<RgbImage> {
        planar_to_rgb(&self.pixels, IMAGE_SIDE, IMAGE_SIDE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Ready,
    Finished,
    Poisoned,
    Closed,
}

/// Reader over one batch file.
///
/// Records have a fixed size, so besides sequential reads through
/// [`next_record`](Self::next_record) any record can be fetched by position
/// with [`get`](Self::get) without moving the cursor.
///
/// A trailing partial record is [`CoreError::MalformedContainer`]; the
/// sequential cursor refuses further reads after it.
#[derive(Debug)]
pub struct CifarReader<B> {
    backend: B,
    layout: CifarLayout,
    offset: u64,
    state: ReaderState,
}

impl CifarReader<FileBackend> {
    /// Opens a batch file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, layout: CifarLayout) -> CoreResult<Self> {
        Ok(Self::new(FileBackend::open(path.as_ref())?, layout))
    }
}

impl<B: StorageBackend> CifarReader<B> {
    /// Creates a reader positioned at the first record.
    pub fn new(backend: B, layout: CifarLayout) -> Self {
        Self {
            backend,
            layout,
            offset: 0,
            state: ReaderState::Ready,
        }
    }

    /// Record layout.
    #[must_use]
    pub fn layout(&self) -> CifarLayout {
        self.layout
    }

    /// Byte offset of the sequential cursor.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of complete records in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend size cannot be read.
    pub fn len(&self) -> CoreResult<u64> {
        Ok(self.backend.size()? / self.layout.record_size() as u64)
    }

    /// Returns whether the file holds no complete record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend size cannot be read.
    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Reads the next record, or `Ok(None)` at the end of the file.
    ///
    /// # Errors
    ///
    /// See the type-level documentation.
    pub fn next_record(&mut self) -> CoreResult<Option<CifarRecord>> {
        match self.state {
            ReaderState::Closed => return Err(StorageError::Closed.into()),
            ReaderState::Poisoned => {
                return Err(CoreError::invalid_operation(
                    "reader stopped after a truncated record",
                ))
            }
            ReaderState::Finished => return Ok(None),
            ReaderState::Ready => {}
        }

        let record_size = self.layout.record_size() as u64;
        let remaining = self.backend.size()?.saturating_sub(self.offset);
        if remaining == 0 {
            self.state = ReaderState::Finished;
            return Ok(None);
        }
        if remaining < record_size {
            self.state = ReaderState::Poisoned;
            return Err(CoreError::malformed(format!(
                "truncated record at offset {}: {remaining} of {record_size} bytes",
                self.offset
            )));
        }

        let bytes = self.backend.read_at(self.offset, record_size as usize)?;
        self.offset += record_size;
        Ok(Some(CifarRecord::parse(self.layout, &bytes)))
    }

    /// Reads the record at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if `index` is past the last complete
    /// record, or [`StorageError::Closed`] after [`close`](Self::close).
    pub fn get(&self, index: u64) -> CoreResult<CifarRecord> {
        if self.state == ReaderState::Closed {
            return Err(StorageError::Closed.into());
        }
        if index >= self.len()? {
            return Err(CoreError::not_found(format!("record {index}")));
        }
        let record_size = self.layout.record_size();
        let bytes = self
            .backend
            .read_at(index * record_size as u64, record_size)?;
        Ok(CifarRecord::parse(self.layout, &bytes))
    }

    /// Releases the backend. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to close.
    pub fn close(&mut self) -> CoreResult<()> {
        if self.state == ReaderState::Closed {
            return Ok(());
        }
        self.state = ReaderState::Closed;
        self.backend.close()?;
        Ok(())
    }
}

impl<B: StorageBackend> Iterator for CifarReader<B> {
    type Item = CoreResult<CifarRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
