//! Inspect command implementation.

use super::{format_size, print_json, CliResult, ContainerKind};
use recset_core::{RecordIoReader, TfRecordReader};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Container summary.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Container path.
    pub path: String,
    /// Detected or requested format.
    pub kind: ContainerKind,
    /// File size in bytes.
    pub file_size: u64,
    /// Number of records or frames.
    pub record_count: usize,
    /// Sum of payload or frame data sizes.
    pub payload_bytes: u64,
    /// Smallest payload, if any record was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_payload: Option<u64>,
    /// Largest payload, if any record was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
    /// Records per distinct label (RecordIO only).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, usize>,
    /// Occurrences of each feature key (TFRecord only).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_keys: BTreeMap<String, usize>,
}

impl InspectResult {
    fn new(path: &Path, kind: ContainerKind) -> CliResult<Self> {
        Ok(Self {
            path: path.display().to_string(),
            kind,
            file_size: fs::metadata(path)?.len(),
            record_count: 0,
            payload_bytes: 0,
            min_payload: None,
            max_payload: None,
            labels: BTreeMap::new(),
            feature_keys: BTreeMap::new(),
        })
    }

    fn add_payload(&mut self, len: u64) {
        self.record_count += 1;
        self.payload_bytes += len;
        self.min_payload = Some(self.min_payload.map_or(len, |m| m.min(len)));
        self.max_payload = Some(self.max_payload.map_or(len, |m| m.max(len)));
    }
}

/// Runs the inspect command.
pub fn run(path: &Path, kind: &str, show_labels: bool, format: &str) -> CliResult<()> {
    let kind = ContainerKind::resolve(kind, path)?;
    let result = inspect(path, kind, show_labels)?;

    match format {
        "json" => print_json(&result)?,
        _ => print_text_output(&result),
    }
    Ok(())
}

/// Scans a container and summarizes it.
pub fn inspect(path: &Path, kind: ContainerKind, with_labels: bool) -> CliResult<InspectResult> {
    let mut result = InspectResult::new(path, kind)?;

    match kind {
        ContainerKind::RecordIo => {
            let mut reader = RecordIoReader::open(path)?;
            while let Some(record) = reader.next_raw()? {
                result.add_payload(record.payload.len() as u64);
                if with_labels {
                    *result.labels.entry(record.label().to_string()).or_default() += 1;
                }
            }
            reader.close()?;
        }
        ContainerKind::TfRecord => {
            let mut reader = TfRecordReader::open(path)?;
            while let Some(frame) = reader.next_frame()? {
                result.add_payload(frame.len() as u64);
                if let Ok(features) = recset_codec::FeatureRecord::decode(&frame) {
                    for key in features.keys() {
                        *result.feature_keys.entry(key.to_string()).or_default() += 1;
                    }
                }
            }
            reader.close()?;
        }
    }

    Ok(result)
}

fn print_text_output(result: &InspectResult) {
    println!("recset Container Inspection");
    println!("===========================");
    println!();
    println!("Path: {}", result.path);
    println!("Kind: {}", result.kind.as_str());
    println!();
    println!("Storage:");
    println!("  File size:     {}", format_size(result.file_size));
    println!("  Payload bytes: {}", format_size(result.payload_bytes));
    println!();
    println!("Records:");
    println!("  Count:         {}", result.record_count);
    if let (Some(min), Some(max)) = (result.min_payload, result.max_payload) {
        println!("  Smallest:      {}", format_size(min));
        println!("  Largest:       {}", format_size(max));
    }

    if !result.labels.is_empty() {
        println!();
        println!("Labels:");
        for (label, count) in &result.labels {
            println!("  {label}: {count}");
        }
    }

    if !result.feature_keys.is_empty() {
        println!();
        println!("Feature keys:");
        for (key, count) in &result.feature_keys {
            println!("  {key}: {count}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recset_testkit::prelude::*;

    #[test]
    fn summarizes_recordio() {
        with_test_dir(|dir| {
            let bytes = RecordIoBuilder::new()
                .record(1.0, 0, 1, &[0; 10])
                .record(1.0, 0, 2, &[0; 3])
                .record(4.0, 0, 3, &[])
                .build();
            let path = dir.write("a.rec", &bytes);

            let result = inspect(&path, ContainerKind::RecordIo, true).unwrap();
            assert_eq!(result.file_size, bytes.len() as u64);
            assert_eq!(result.record_count, 3);
            assert_eq!(result.payload_bytes, 13);
            assert_eq!(result.min_payload, Some(0));
            assert_eq!(result.max_payload, Some(10));
            assert_eq!(result.labels.get("1"), Some(&2));
            assert_eq!(result.labels.get("4"), Some(&1));
        });
    }

    #[test]
    fn summarizes_tfrecord_keys() {
        with_test_dir(|dir| {
            let example = ExampleBuilder::new().int64("image/height", 4).build();
            let bytes = TfRecordBuilder::new()
                .example(&example)
                .example(&example)
                .frame(b"not an example \xff")
                .build();
            let path = dir.write("a.tfrecord", &bytes);

            let result = inspect(&path, ContainerKind::TfRecord, false).unwrap();
            assert_eq!(result.record_count, 3);
            assert_eq!(result.feature_keys.get("image/height"), Some(&2));
            assert!(result.labels.is_empty());
        });
    }

    #[test]
    fn malformed_container_fails() {
        with_test_dir(|dir| {
            let path = dir.write("bad.rec", [0x0a_u8, 0x23, 0xd7, 0xce, 0x00]);
            assert!(inspect(&path, ContainerKind::RecordIo, false).is_err());
        });
    }
}
