//! Feature value sum type.

use crate::proto;
use std::fmt;

/// The kind of list stored under a feature key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// 64-bit signed integers.
    Int64,
    /// 32-bit floats.
    Float,
    /// Byte strings.
    Bytes,
}

impl FeatureKind {
    /// Returns a short lowercase name for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed feature value.
///
/// Every value is a list; a "scalar" feature is a list whose first element
/// is the value.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// List of 64-bit integers.
    Int64List(Vec<i64>),
    /// List of 32-bit floats.
    FloatList(Vec<f32>),
    /// List of byte strings.
    BytesList(Vec<Vec<u8>>),
}

impl FeatureValue {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Int64List(_) => FeatureKind::Int64,
            Self::FloatList(_) => FeatureKind::Float,
            Self::BytesList(_) => FeatureKind::Bytes,
        }
    }

    /// Returns the number of elements in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int64List(v) => v.len(),
            Self::FloatList(v) => v.len(),
            Self::BytesList(v) => v.len(),
        }
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the integers, if this is an integer list.
    pub fn as_int64_list(&self) -> Option<&[i64]> {
        match self {
            Self::Int64List(v) => Some(v),
            _ => None,
        }
    }

    /// Get the floats, if this is a float list.
    pub fn as_float_list(&self) -> Option<&[f32]> {
        match self {
            Self::FloatList(v) => Some(v),
            _ => None,
        }
    }

    /// Get the byte strings, if this is a bytes list.
    pub fn as_bytes_list(&self) -> Option<&[Vec<u8>]> {
        match self {
            Self::BytesList(v) => Some(v),
            _ => None,
        }
    }

    /// Converts a protobuf feature. A feature without a kind has no value.
    pub(crate) fn from_proto(feature: proto::Feature) -> Option<Self> {
        feature.kind.map(|kind| match kind {
            proto::feature::Kind::Int64List(list) => Self::Int64List(list.value),
            proto::feature::Kind::FloatList(list) => Self::FloatList(list.value),
            proto::feature::Kind::BytesList(list) => Self::BytesList(list.value),
        })
    }
}

impl From<Vec<i64>> for FeatureValue {
    fn from(v: Vec<i64>) -> Self {
        Self::Int64List(v)
    }
}

impl From<Vec<f32>> for FeatureValue {
    fn from(v: Vec<f32>) -> Self {
        Self::FloatList(v)
    }
}

impl From<Vec<Vec<u8>>> for FeatureValue {
    fn from(v: Vec<Vec<u8>>) -> Self {
        Self::BytesList(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(n: i64) -> Self {
        Self::Int64List(vec![n])
    }
}

impl From<f32> for FeatureValue {
    fn from(x: f32) -> Self {
        Self::FloatList(vec![x])
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        Self::BytesList(vec![s.as_bytes().to_vec()])
    }
}

impl From<Vec<&str>> for FeatureValue {
    fn from(v: Vec<&str>) -> Self {
        Self::BytesList(v.into_iter().map(|s| s.as_bytes().to_vec()).collect())
    }
}
