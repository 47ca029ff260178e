//! # recset Storage
//!
//! Read-only storage backends for recset containers.
//!
//! Backends are **opaque byte stores**: they hand out byte ranges and know
//! nothing about RecordIO headers, TFRecord frames or listing files. All
//! format interpretation lives in `recset_core`.
//!
//! ## Design Principles
//!
//! - Backends expose positional reads (`read_at`) and their total size
//! - Reads never extend past the end; callers can bounds-check a declared
//!   length against `size()` before allocating
//! - `close` releases the underlying handle and may be called repeatedly
//! - Must be `Send + Sync` so a data file can be shared between range views
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For tests and in-memory containers
//! - [`FileBackend`] - For container files on disk
//! - [`RangeBackend`] - A window `[start, end)` over another backend
//!
//! ## Example
//!
//! ```rust
//! use recset_storage::{InMemoryBackend, RangeBackend, StorageBackend};
//!
//! let backend = InMemoryBackend::with_data(b"hello world".to_vec());
//! let range = RangeBackend::new(backend, 6, 11).unwrap();
//! assert_eq!(range.read_at(0, 5).unwrap(), b"world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod range;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
pub use range::RangeBackend;
