//! Sequential RecordIO reader.

use super::header::{
    padding_for, split_length_word, RecordHeader, PREFIX_SIZE, RECORDIO_MAGIC, SUB_HEADER_SIZE,
};
use super::RawRecord;
use crate::error::{CoreError, CoreResult};
use crate::raster::ImageDecoder;
use crate::record::ImageRecord;
use recset_storage::{FileBackend, StorageBackend, StorageError};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Ready,
    Finished,
    Poisoned,
    Closed,
}

/// Pull-based reader over a RecordIO stream.
///
/// Each call to [`next_raw`](Self::next_raw) or
/// [`next_record`](Self::next_record) consumes exactly one record and its
/// padding. `Ok(None)` marks a clean end of stream and is returned again on
/// every later call.
///
/// # Error Handling
///
/// - Framing violations (bad magic, multi-part flag, truncated header or
///   payload) return [`CoreError::MalformedContainer`]; the reader then
///   refuses further reads with [`CoreError::InvalidOperation`]
/// - Declared payload lengths are checked against the bytes left in the
///   backend before anything is allocated
/// - Image errors from [`next_record`](Self::next_record) leave the cursor
///   on the next record
///
/// # Example
///
/// ```rust,ignore
/// let mut reader = RecordIoReader::open(path)?;
/// while let Some(record) = reader.next_record(&StandardImageDecoder)? {
///     println!("{} -> {}", record.id, record.label_index);
/// }
/// reader.close()?;
/// ```
#[derive(Debug)]
pub struct RecordIoReader<B> {
    backend: B,
    offset: u64,
    state: ReaderState,
    strict_padding: bool,
}

impl RecordIoReader<FileBackend> {
    /// Opens a RecordIO file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        Ok(Self::new(FileBackend::open(path.as_ref())?))
    }
}

impl<B: StorageBackend> RecordIoReader<B> {
    /// Creates a reader positioned at the start of `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            offset: 0,
            state: ReaderState::Ready,
            strict_padding: false,
        }
    }

    /// Sets whether a short padding read at the end of the stream is an
    /// error instead of a warning.
    #[must_use]
    pub fn strict_padding(mut self, value: bool) -> Self {
        self.strict_padding = value;
        self
    }

    /// Current byte offset of the cursor.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the underlying backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Reads the next record without decoding its payload.
    ///
    /// # Errors
    ///
    /// See the type-level documentation.
    pub fn next_raw(&mut self) -> CoreResult<Option<RawRecord>> {
        match self.state {
            ReaderState::Closed => return Err(StorageError::Closed.into()),
            ReaderState::Poisoned => {
                return Err(CoreError::invalid_operation(
                    "reader stopped after a malformed record",
                ))
            }
            ReaderState::Finished => return Ok(None),
            ReaderState::Ready => {}
        }

        match self.read_record() {
            Ok(Some(record)) => Ok(Some(record)),
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

    /// Reads the next record and decodes its payload with `decoder`.
    ///
    /// # Errors
    ///
    /// Besides the framing errors of [`next_raw`](Self::next_raw), returns
    /// the decoder's error when the payload is not an RGB image.
    pub fn next_record(&mut self, decoder: &dyn ImageDecoder) -> CoreResult<Option<ImageRecord>> {
        let Some(raw) = self.next_raw()? else {
            return Ok(None);
        };
        let image = decoder.decode(&raw.payload)?;
        Ok(Some(ImageRecord {
            id: raw.id(),
            label_index: raw.label(),
            image,
        }))
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

    fn read_record(&mut self) -> CoreResult<Option<RawRecord>> {
        let size = self.backend.size()?;
        let remaining = size.saturating_sub(self.offset);
        if remaining == 0 {
            return Ok(None);
        }

        let prefix_len = remaining.min(PREFIX_SIZE as u64) as usize;
        let prefix = self.backend.read_at(self.offset, prefix_len)?;
        if prefix.len() < 4 {
            return Err(CoreError::malformed("truncated header"));
        }

        let magic = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        if magic != RECORDIO_MAGIC {
            return Err(CoreError::malformed(format!(
                "invalid magic {magic:#010x} at offset {}",
                self.offset
            )));
        }
        if prefix.len() < PREFIX_SIZE {
            return Err(CoreError::malformed("truncated header"));
        }

        let word = u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]);
        let (flag, length) = split_length_word(word);
        if flag != 0 {
            return Err(CoreError::malformed(format!(
                "unsupported multi-part record (flag {flag})"
            )));
        }
        if (length as usize) < SUB_HEADER_SIZE {
            return Err(CoreError::malformed(format!(
                "record length {length} is shorter than the {SUB_HEADER_SIZE}-byte header"
            )));
        }

        let header_start = self.offset + PREFIX_SIZE as u64;
        if size - header_start < SUB_HEADER_SIZE as u64 {
            return Err(CoreError::malformed("truncated header"));
        }
        let sub = self.backend.read_at(header_start, SUB_HEADER_SIZE)?;
        let header = RecordHeader::parse(length, &sub)?;

        let payload_start = header_start + SUB_HEADER_SIZE as u64;
        let payload_len = u64::from(header.payload_len());
        let available = size - payload_start;
        if available < payload_len {
            return Err(CoreError::malformed(format!(
                "truncated payload: {payload_len} bytes declared, {available} remain"
            )));
        }
        let payload = self.backend.read_at(payload_start, payload_len as usize)?;

        let payload_end = payload_start + payload_len;
        let padding = padding_for(length);
        let trailing = size - payload_end;
        if trailing < padding {
            if self.strict_padding {
                return Err(CoreError::malformed(format!(
                    "truncated padding: {padding} bytes expected, {trailing} remain"
                )));
            }
            warn!(
                offset = payload_end,
                expected = padding,
                available = trailing,
                "short padding read after last record"
            );
            self.offset = size;
        } else {
            self.offset = payload_end + padding;
        }

        Ok(Some(RawRecord { header, payload }))
    }
}

impl<B: StorageBackend> Iterator for RecordIoReader<B> {
    type Item = CoreResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_raw().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::StandardImageDecoder;
    use proptest::prelude::*;
    use recset_storage::InMemoryBackend;
    use recset_testkit::prelude::*;

    fn reader(bytes: Vec<u8>) -> RecordIoReader<InMemoryBackend> {
        RecordIoReader::new(InMemoryBackend::with_data(bytes))
    }

    #[test]
    fn empty_stream_is_end() {
        let mut r = reader(Vec::new());
        assert!(r.next_raw().unwrap().is_none());
        assert!(r.next_raw().unwrap().is_none());
    }

    #[test]
    fn decodes_validation_record() {
        let spec = validation_record();
        let mut r = reader(RecordIoBuilder::new().push(&spec).build());

        let record = r.next_record(&StandardImageDecoder).unwrap().unwrap();
        assert_eq!(record.id, VALIDATION_ID1);
        assert_eq!(record.label_index, VALIDATION_LABEL);
        assert_eq!(record.image, rgb_image(8, 6));
        assert!(r.next_record(&StandardImageDecoder).unwrap().is_none());
    }

    #[test]
    fn raw_record_keeps_header_fields() {
        let mut r = reader(RecordIoBuilder::new().record(3.0, 11, 22, b"abcde").build());
        let raw = r.next_raw().unwrap().unwrap();
        assert_eq!(raw.header.id0, 11);
        assert_eq!(raw.id(), 22);
        assert_eq!(raw.label(), 3.0);
        assert_eq!(raw.payload, b"abcde");
        assert_eq!(r.offset(), raw.header.framed_len());
    }

    #[test]
    fn zero_length_payload() {
        let mut r = reader(RecordIoBuilder::new().record(1.0, 0, 5, &[]).build());
        let raw = r.next_raw().unwrap().unwrap();
        assert!(raw.payload.is_empty());
        assert!(r.next_raw().unwrap().is_none());
    }

    #[test]
    fn invalid_magic() {
        let mut bytes = RecordIoBuilder::new().record(1.0, 0, 1, b"xy").build();
        bytes[0] ^= 0xff;
        let mut r = reader(bytes);
        let err = r.next_raw().unwrap_err();
        assert!(matches!(err, CoreError::MalformedContainer { .. }));
        assert!(err.to_string().contains("invalid magic"));
    }

    #[test]
    fn multi_part_flag_rejected() {
        let spec = RecordSpec::new(1.0, 0, 1, b"payload".to_vec());
        let mut r = reader(RecordIoBuilder::new().record_with_flag(1, &spec).build());
        let err = r.next_raw().unwrap_err();
        assert!(err.to_string().contains("multi-part"));
    }

    #[test]
    fn truncated_header() {
        let bytes = RecordIoBuilder::new().record(1.0, 0, 1, b"xy").build();
        for cut in [2, 6, 20] {
            let mut r = reader(bytes[..cut].to_vec());
            let err = r.next_raw().unwrap_err();
            assert!(err.is_malformed(), "cut at {cut}");
        }
    }

    #[test]
    fn length_shorter_than_header() {
        let spec = RecordSpec::new(1.0, 0, 1, Vec::new());
        let mut r = reader(encode_recordio(10, &spec));
        assert!(r.next_raw().unwrap_err().is_malformed());
    }

    #[test]
    fn huge_length_rejected_before_allocation() {
        let spec = RecordSpec::new(1.0, 0, 1, b"tiny".to_vec());
        let word = (1 << 29) - 1;
        let mut r = reader(encode_recordio(word, &spec));
        let err = r.next_raw().unwrap_err();
        assert!(err.to_string().contains("truncated payload"));
    }

    #[test]
    fn poisoned_after_malformed() {
        let mut r = reader(vec![0u8; 64]);
        assert!(r.next_raw().unwrap_err().is_malformed());
        assert!(matches!(
            r.next_raw(),
            Err(CoreError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn short_padding_tolerated_by_default() {
        let mut bytes = RecordIoBuilder::new().record(1.0, 0, 1, b"abc").build();
        bytes.pop();
        let mut r = reader(bytes);
        assert_eq!(r.next_raw().unwrap().unwrap().payload, b"abc");
        assert!(r.next_raw().unwrap().is_none());
    }

    #[test]
    fn short_padding_rejected_when_strict() {
        let mut bytes = RecordIoBuilder::new().record(1.0, 0, 1, b"abc").build();
        bytes.pop();
        let mut r = reader(bytes).strict_padding(true);
        let err = r.next_raw().unwrap_err();
        assert!(err.to_string().contains("truncated padding"));
    }

    #[test]
    fn image_errors_do_not_poison() {
        let bytes = RecordIoBuilder::new()
            .record(1.0, 0, 1, &gray_png(2, 2))
            .record(2.0, 0, 2, &rgb_png(2, 2))
            .build();
        let mut r = reader(bytes);

        let err = r.next_record(&StandardImageDecoder).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedImageLayout { .. }));

        let record = r.next_record(&StandardImageDecoder).unwrap().unwrap();
        assert_eq!(record.id, 2);
    }

    #[test]
    fn close_is_idempotent() {
        let mut r = reader(RecordIoBuilder::new().record(1.0, 0, 1, b"a").build());
        r.close().unwrap();
        r.close().unwrap();
        assert!(matches!(
            r.next_raw(),
            Err(CoreError::Storage(StorageError::Closed))
        ));
    }

    #[test]
    fn iterator_yields_all_records() {
        let bytes = RecordIoBuilder::new()
            .record(0.0, 0, 1, b"a")
            .record(0.0, 0, 2, b"bb")
            .record(0.0, 0, 3, b"ccc")
            .build();
        let ids: Vec<u64> = reader(bytes).map(|r| r.unwrap().id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    proptest! {
        #[test]
        fn records_partition_the_stream(specs in record_stream_strategy()) {
            let mut builder = RecordIoBuilder::new();
            for spec in &specs {
                builder = builder.push(spec);
            }
            let bytes = builder.build();
            let total = bytes.len() as u64;
            let mut r = reader(bytes);

            let mut consumed = 0u64;
            for spec in &specs {
                let raw = r.next_raw().unwrap().unwrap();
                prop_assert_eq!(raw.id(), spec.id1);
                prop_assert_eq!(raw.header.id0, spec.id0);
                prop_assert_eq!(&raw.payload, &spec.payload);
                consumed += raw.header.framed_len();
                prop_assert_eq!(r.offset(), consumed);
            }
            prop_assert_eq!(consumed, total);
            prop_assert!(r.next_raw().unwrap().is_none());
        }

        #[test]
        fn any_other_magic_is_malformed(magic in bad_magic_strategy()) {
            let mut bytes = RecordIoBuilder::new().record(1.0, 0, 1, b"abcd").build();
            bytes[..4].copy_from_slice(&magic.to_le_bytes());
            let err = reader(bytes).next_raw().unwrap_err();
            prop_assert!(
                matches!(err, CoreError::MalformedContainer { .. }),
                "unexpected error: {}",
                err
            );
        }

        #[test]
        fn any_flag_is_malformed(flag in 1u32..8, payload in payload_strategy()) {
            let spec = RecordSpec::new(1.0, 0, 1, payload);
            let bytes = RecordIoBuilder::new().record_with_flag(flag, &spec).build();
            prop_assert!(reader(bytes).next_raw().unwrap_err().is_malformed());
        }
    }
}
