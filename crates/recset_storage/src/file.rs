//! File-based storage backend for container files on disk.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A read-only file backend.
///
/// The file is opened once and every `read_at` seeks to the requested
/// offset. The size is captured at open time; container files are not
/// expected to change while they are being decoded.
///
/// # Thread Safety
///
/// The handle sits behind a lock, so one backend can be shared (for example
/// through an `Arc`) by several [`crate::RangeBackend`] views.
///
/// # Example
///
/// ```no_run
/// use recset_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("train.rec")).unwrap();
/// let magic = backend.read_at(0, 4).unwrap();
/// backend.close().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: RwLock<Option<File>>,
    size: u64,
}

impl FileBackend {
    /// Opens an existing file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its metadata read.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(Some(file)),
            size,
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut guard = self.file.write();
        let file = guard.as_mut().ok_or(StorageError::Closed)?;

        let end = offset.saturating_add(len as u64);
        if offset > self.size || end > self.size {
            return Err(StorageError::ReadPastEnd {
                offset,
                len,
                size: self.size,
            });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn size(&self) -> StorageResult<u64> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        Ok(self.size)
    }

    fn close(&self) -> StorageResult<()> {
        // Dropping the handle closes it.
        self.file.write().take();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.file.read().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(data).unwrap();
        path
    }

    #[test]
    fn file_open_missing_fails() {
        let dir = tempdir().unwrap();
        let result = FileBackend::open(&dir.path().join("missing.rec"));
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn file_size_matches_content() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "data.bin", b"hello world");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 11);
    }

    #[test]
    fn file_read_partial() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "data.bin", b"hello world");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.read_at(0, 5).unwrap(), b"hello");
        assert_eq!(backend.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn file_read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "data.bin", b"hello");

        let backend = FileBackend::open(&path).unwrap();
        let result = backend.read_at(3, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn file_empty_read() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "data.bin", b"hello");

        let backend = FileBackend::open(&path).unwrap();
        assert!(backend.read_at(5, 0).unwrap().is_empty());
    }

    #[test]
    fn file_close_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "data.bin", b"hello");

        let backend = FileBackend::open(&path).unwrap();
        assert!(!backend.is_closed());
        backend.close().unwrap();
        backend.close().unwrap();
        assert!(backend.is_closed());
        assert!(matches!(backend.read_at(0, 1), Err(StorageError::Closed)));
        assert!(matches!(backend.size(), Err(StorageError::Closed)));
    }

    #[test]
    fn file_path() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "data.bin", b"x");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.path(), path);
    }
}
