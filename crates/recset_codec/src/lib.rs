//! # recset Codec
//!
//! Typed feature-record access for example containers.
//!
//! An example container stores one protocol-buffer `Example` per frame: a
//! flat map from string keys to a list of 64-bit integers, 32-bit floats or
//! byte strings. This crate parses that message and exposes it as a
//! [`FeatureRecord`] whose accessors never fail:
//!
//! - a missing key yields the zero value (`0`, `0.0`, empty bytes/list)
//! - a key holding a different kind yields the same zero value
//! - a scalar accessor reads the first element of the stored list
//!
//! Callers rely on this to read optional per-object metadata without
//! branching on presence first. Use [`FeatureRecord::contains_key`] when
//! "absent" and "present but empty" must be told apart.
//!
//! The crate also provides the masked CRC-32C used to frame examples on
//! disk ([`masked_crc32c`]).
//!
//! ## Usage
//!
//! ```
//! use recset_codec::{FeatureRecord, FeatureValue};
//!
//! let record: FeatureRecord = [
//!     ("image/height".to_string(), FeatureValue::Int64List(vec![480])),
//!     ("image/filename".to_string(), FeatureValue::BytesList(vec![b"a.jpg".to_vec()])),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(record.get_int64("image/height"), 480);
//! assert_eq!(record.get_string("image/filename"), "a.jpg");
//! assert_eq!(record.get_float("image/height"), 0.0);
//! assert_eq!(record.get_int64("missing"), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod crc;
mod error;
pub mod proto;
mod record;
mod value;

pub use crc::{crc32c, mask_crc, masked_crc32c};
pub use error::{CodecError, CodecResult};
pub use record::FeatureRecord;
pub use value::{FeatureKind, FeatureValue};
