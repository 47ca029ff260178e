//! # recset Testkit
//!
//! Test utilities for recset.
//!
//! This crate provides:
//! - Builders for RecordIO streams, TFRecord streams and `Example` messages
//! - Temporary directories and small encoded images for payloads
//! - Property-based test generators using proptest
//! - Known-answer vectors
//!
//! ## Usage
//!
//! ```rust
//! use recset_testkit::prelude::*;
//!
//! let stream = RecordIoBuilder::new()
//!     .record(1.0, 0, 7, &rgb_png(4, 4))
//!     .build();
//! assert_eq!(stream.len() % 4, 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builders::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
