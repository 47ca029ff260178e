//! Feature records and their soft accessors.

use crate::error::CodecResult;
use crate::proto;
use crate::value::{FeatureKind, FeatureValue};
use prost::Message;
use std::collections::HashMap;

/// A decoded example: feature name to typed value.
///
/// Every `get_*` accessor returns a zero value instead of failing when the
/// key is missing, when the stored list has a different kind, or (for
/// scalars) when the list is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    features: HashMap<String, FeatureValue>,
}

impl FeatureRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a protobuf `Example`.
    ///
    /// An example without a feature map decodes to an empty record, and
    /// features without a kind are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid `Example` message.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let example = proto::Example::decode(bytes)?;
        Ok(Self::from_example(example))
    }

    /// Builds a record from an already parsed `Example`.
    #[must_use]
    pub fn from_example(example: proto::Example) -> Self {
        let features = example
            .features
            .map(|f| f.feature)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, feature)| FeatureValue::from_proto(feature).map(|v| (key, v)))
            .collect();
        Self { features }
    }

    /// Inserts or replaces a feature.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FeatureValue>) {
        self.features.insert(key.into(), value.into());
    }

    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.features.get(key)
    }

    /// Returns whether `key` is present, whatever its kind or length.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }

    /// Returns the kind stored under `key`.
    #[must_use]
    pub fn kind(&self, key: &str) -> Option<FeatureKind> {
        self.features.get(key).map(FeatureValue::kind)
    }

    /// Returns the feature names in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.features.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Returns the number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns whether the record has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    // Scalars

    /// First integer under `key`, or `0`.
    #[must_use]
    pub fn get_int64(&self, key: &str) -> i64 {
        self.get_int64_list(key).first().copied().unwrap_or(0)
    }

    /// First integer under `key` as `i32` (truncating), or `0`.
    #[must_use]
    pub fn get_int32(&self, key: &str) -> i32 {
        self.get_int64(key) as i32
    }

    /// First integer under `key` as `usize`, or `0` when missing or negative.
    #[must_use]
    pub fn get_int(&self, key: &str) -> usize {
        usize::try_from(self.get_int64(key)).unwrap_or(0)
    }

    /// `true` when the first integer under `key` equals `1`.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.get_int64(key) == 1
    }

    /// First float under `key`, or `0.0`.
    #[must_use]
    pub fn get_float(&self, key: &str) -> f32 {
        self.get_float_list(key).first().copied().unwrap_or(0.0)
    }

    /// First float under `key` widened to `f64`, or `0.0`.
    #[must_use]
    pub fn get_float64(&self, key: &str) -> f64 {
        f64::from(self.get_float(key))
    }

    /// First byte string under `key`, or an empty slice.
    #[must_use]
    pub fn get_bytes(&self, key: &str) -> &[u8] {
        self.get_bytes_list(key)
            .first()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First byte string under `key` as text, or an empty string.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        String::from_utf8_lossy(self.get_bytes(key)).into_owned()
    }

    // Lists

    /// All integers under `key`, or an empty slice.
    #[must_use]
    pub fn get_int64_list(&self, key: &str) -> &[i64] {
        self.features
            .get(key)
            .and_then(FeatureValue::as_int64_list)
            .unwrap_or(&[])
    }

    /// All integers under `key` truncated to `i32`.
    #[must_use]
    pub fn get_int32_list(&self, key: &str) -> Vec<i32> {
        self.get_int64_list(key).iter().map(|&v| v as i32).collect()
    }

    /// All floats under `key`, or an empty slice.
    #[must_use]
    pub fn get_float_list(&self, key: &str) -> &[f32] {
        self.features
            .get(key)
            .and_then(FeatureValue::as_float_list)
            .unwrap_or(&[])
    }

    /// All floats under `key` widened to `f64`.
    #[must_use]
    pub fn get_float64_list(&self, key: &str) -> Vec<f64> {
        self.get_float_list(key)
            .iter()
            .map(|&v| f64::from(v))
            .collect()
    }

    /// All byte strings under `key`, or an empty slice.
    #[must_use]
    pub fn get_bytes_list(&self, key: &str) -> &[Vec<u8>] {
        self.features
            .get(key)
            .and_then(FeatureValue::as_bytes_list)
            .unwrap_or(&[])
    }

    /// All byte strings under `key` as text.
    #[must_use]
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.get_bytes_list(key)
            .iter()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .collect()
    }
}

impl FromIterator<(String, FeatureValue)> for FeatureRecord {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}
