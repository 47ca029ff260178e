//! In-memory storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory backend over an owned byte buffer.
///
/// Suitable for unit tests and for containers that were fetched into
/// memory by some other means.
///
/// # Example
///
/// ```rust
/// use recset_storage::{InMemoryBackend, StorageBackend};
///
/// let backend = InMemoryBackend::with_data(b"test data".to_vec());
/// assert_eq!(backend.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: Vec<u8>,
    closed: AtomicBool,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend serving the given bytes.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data,
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the bytes held by the backend.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }

        let size = self.data.len() as u64;
        let end = offset.saturating_add(len as u64);
        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(self.data[offset as usize..end as usize].to_vec())
    }

    fn size(&self) -> StorageResult<u64> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        Ok(self.data.len() as u64)
    }

    fn close(&self) -> StorageResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
