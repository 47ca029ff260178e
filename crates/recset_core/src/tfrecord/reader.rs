//! Sequential TFRecord reader.

use super::frame::{verify_crc, FrameHeader, FRAME_FOOTER_SIZE, FRAME_HEADER_SIZE};
use super::image_record_from_features;
use crate::error::{CoreError, CoreResult};
use crate::raster::ImageDecoder;
use crate::record::ImageRecord;
use recset_codec::FeatureRecord;
use recset_storage::{FileBackend, StorageBackend, StorageError};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Ready,
    Finished,
    Poisoned,
    Closed,
}

/// Pull-based reader over a TFRecord stream of `Example` messages.
///
/// Shares the contract of [`RecordIoReader`](crate::RecordIoReader):
/// `Ok(None)` at end of stream, framing and checksum errors stop the reader,
/// decode errors of a single example do not.
#[derive(Debug)]
pub struct TfRecordReader<B> {
    backend: B,
    offset: u64,
    state: ReaderState,
    verify_crc: bool,
}

impl TfRecordReader<FileBackend> {
    /// Opens a TFRecord file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        Ok(Self::new(FileBackend::open(path.as_ref())?))
    }
}

impl<B: StorageBackend> TfRecordReader<B> {
    /// Creates a reader positioned at the start of `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            offset: 0,
            state: ReaderState::Ready,
            verify_crc: true,
        }
    }

    /// Sets whether frame checksums are verified.
    #[must_use]
    pub fn verify_crc(mut self, value: bool) -> Self {
        self.verify_crc = value;
        self
    }

    /// Current byte offset of the cursor.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads the data of the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedContainer`] for a truncated frame and
    /// [`CoreError::ChecksumMismatch`] for a corrupted one.
    pub fn next_frame(&mut self) -> CoreResult<Option<Vec<u8>>> {
        match self.state {
            ReaderState::Closed => return Err(StorageError::Closed.into()),
            ReaderState::Poisoned => {
                return Err(CoreError::invalid_operation(
                    "reader stopped after a malformed frame",
                ))
            }
            ReaderState::Finished => return Ok(None),
            ReaderState::Ready => {}
        }

        match self.read_frame() {
            Ok(Some(data)) => Ok(Some(data)),
            Ok(None) => {
                self.state = ReaderState::Finished;
                Ok(None)
            }
            Err(err) => {
                if err.is_malformed() {
                    self.state = ReaderState::Poisoned;
                }
                Err(err)
            }
        }
    }

    /// Reads and decodes the next `Example`.
    ///
    /// # Errors
    ///
    /// Besides the framing errors of [`next_frame`](Self::next_frame),
    /// returns [`CoreError::Codec`] if the frame is not a valid `Example`.
    pub fn next_example(&mut self) -> CoreResult<Option<FeatureRecord>> {
        match self.next_frame()? {
            Some(data) => Ok(Some(FeatureRecord::decode(&data)?)),
            None => Ok(None),
        }
    }

    /// Reads the next example as a classified image.
    ///
    /// # Errors
    ///
    /// See [`next_example`](Self::next_example); image errors come from
    /// `decoder`, or from the planar layout check for `cifar` examples.
    pub fn next_image(&mut self, decoder: &dyn ImageDecoder) -> CoreResult<Option<ImageRecord>> {
        match self.next_example()? {
            Some(features) => Ok(Some(image_record_from_features(&features, decoder)?)),
            None => Ok(None),
        }
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

    fn read_frame(&mut self) -> CoreResult<Option<Vec<u8>>> {
        let size = self.backend.size()?;
        let remaining = size.saturating_sub(self.offset);
        if remaining == 0 {
            return Ok(None);
        }
        if remaining < FRAME_HEADER_SIZE as u64 {
            return Err(CoreError::malformed("truncated frame header"));
        }

        let raw_header = self.backend.read_at(self.offset, FRAME_HEADER_SIZE)?;
        let header = FrameHeader::parse(&raw_header, self.verify_crc)?;

        let data_start = self.offset + FRAME_HEADER_SIZE as u64;
        let available = size - data_start;
        if header.length > available || available - header.length < FRAME_FOOTER_SIZE as u64 {
            return Err(CoreError::malformed(format!(
                "truncated frame: {} data bytes declared, {available} remain",
                header.length
            )));
        }

        let data = self.backend.read_at(data_start, header.length as usize)?;
        let footer = self
            .backend
            .read_at(data_start + header.length, FRAME_FOOTER_SIZE)?;
        if self.verify_crc {
            let stored = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
            verify_crc(&data, stored)?;
        }

        self.offset += header.framed_len();
        Ok(Some(data))
    }
}

impl<B: StorageBackend> Iterator for TfRecordReader<B> {
    type Item = CoreResult<FeatureRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_example().transpose()
    }
}
