//! Storage backend trait definition.

use crate::error::StorageResult;
use std::sync::Arc;

/// A read-only byte store holding one container file.
///
/// # Invariants
///
/// - `read_at` returns exactly `len` bytes or an error, never a short buffer
/// - `size` is stable for the lifetime of the backend
/// - after `close`, reads fail with [`crate::StorageError::Closed`]
/// - `close` is idempotent
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For files on disk
/// - [`super::RangeBackend`] - For a byte window of another backend
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The read would extend beyond the current size
    /// - The backend has been closed
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Returns the size of the store in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Releases the underlying handle.
    ///
    /// Calling `close` more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the handle fails.
    fn close(&self) -> StorageResult<()>;

    /// Returns whether [`StorageBackend::close`] has been called.
    fn is_closed(&self) -> bool;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        (**self).read_at(offset, len)
    }

    fn size(&self) -> StorageResult<u64> {
        (**self).size()
    }

    fn close(&self) -> StorageResult<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<T: StorageBackend + ?Sized> StorageBackend for Box<T> {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        (**self).read_at(offset, len)
    }

    fn size(&self) -> StorageResult<u64> {
        (**self).size()
    }

    fn close(&self) -> StorageResult<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}
