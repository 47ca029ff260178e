//! Bounded views over another backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// A window `[start, end)` of an inner backend.
///
/// Offsets passed to [`StorageBackend::read_at`] are relative to `start`,
/// and the view reports `end - start` as its size, so a reader bound to a
/// `RangeBackend` sees exactly the bytes of one index entry and hits end of
/// stream at `end`.
///
/// Closing a view only closes the view. The inner backend is commonly shared
/// through an `Arc` and stays open for other views.
///
/// # Example
///
/// ```rust
/// use recset_storage::{InMemoryBackend, RangeBackend, StorageBackend};
/// use std::sync::Arc;
///
/// let data = Arc::new(InMemoryBackend::with_data(b"aaaabbbbcccc".to_vec()));
/// let second = RangeBackend::new(Arc::clone(&data), 4, 8).unwrap();
/// assert_eq!(second.size().unwrap(), 4);
/// assert_eq!(second.read_at(0, 4).unwrap(), b"bbbb");
/// ```
#[derive(Debug)]
pub struct RangeBackend<B> {
    inner: B,
    start: u64,
    end: u64,
    closed: AtomicBool,
}

impl<B: StorageBackend> RangeBackend<B> {
    /// Creates a view of `[start, end)` over `inner`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRange`] if `start > end` or `end`
    /// exceeds the size of `inner`.
    pub fn new(inner: B, start: u64, end: u64) -> StorageResult<Self> {
        let size = inner.size()?;
        if start > end || end > size {
            return Err(StorageError::InvalidRange { start, end, size });
        }

        Ok(Self {
            inner,
            start,
            end,
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the absolute start offset of the window.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Returns the absolute end offset of the window.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Returns the wrapped backend.
    #[must_use]
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: StorageBackend> StorageBackend for RangeBackend<B> {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }

        let size = self.end - self.start;
        let end = offset.saturating_add(len as u64);
        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        self.inner.read_at(self.start + offset, len)
    }

    fn size(&self) -> StorageResult<u64> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        Ok(self.end - self.start)
    }

    fn close(&self) -> StorageResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.inner.is_closed()
    }
}
