//! Protobuf messages of the example schema.
//!
//! These mirror `example.proto` / `feature.proto` field for field. Only the
//! messages needed to read a flat feature map are declared;
//! `SequenceExample` and `FeatureLists` are not supported.

use std::collections::HashMap;

/// A single training example: a map of named features.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Example {
    /// The feature map. Absent on an empty example.
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

/// Map from feature name to feature.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Features {
    /// Named features.
    #[prost(map = "string, message", tag = "1")]
    pub feature: HashMap<String, Feature>,
}

/// One feature: a list of a single kind.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Feature {
    /// The stored list, if any.
    #[prost(oneof = "feature::Kind", tags = "1, 2, 3")]
    pub kind: Option<feature::Kind>,
}

/// Nested types of [`Feature`].
pub mod feature {
    /// The kind of list held by a feature.
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        /// Byte strings.
        #[prost(message, tag = "1")]
        BytesList(super::BytesList),
        /// 32-bit floats.
        #[prost(message, tag = "2")]
        FloatList(super::FloatList),
        /// 64-bit integers.
        #[prost(message, tag = "3")]
        Int64List(super::Int64List),
    }
}

/// List of byte strings.
#[derive(Clone, PartialEq, prost::Message)]
pub struct BytesList {
    /// Values.
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

/// List of 32-bit floats.
#[derive(Clone, PartialEq, prost::Message)]
pub struct FloatList {
    /// Values.
    #[prost(float, repeated, tag = "1")]
    pub value: Vec<f32>,
}

/// List of 64-bit integers.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Int64List {
    /// Values.
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}
