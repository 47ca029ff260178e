//! Dump command implementation.

use super::{print_json, CliResult, ContainerKind};
use recset_codec::{FeatureRecord, FeatureValue};
use recset_core::{RecordIoReader, TfRecordReader};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One record of the dump.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Position in the container.
    pub index: usize,
    /// Byte offset of the record.
    pub offset: u64,
    /// Payload or frame data size in bytes.
    pub size: usize,
    /// Record label (RecordIO only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<f32>,
    /// First id field (RecordIO only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id0: Option<u64>,
    /// Second id field (RecordIO only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id1: Option<u64>,
    /// Feature summaries keyed by name (TFRecord only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeMap<String, String>>,
}

/// Runs the dump command.
pub fn run(path: &Path, kind: &str, skip: usize, limit: Option<usize>, format: &str) -> CliResult<()> {
    let kind = ContainerKind::resolve(kind, path)?;
    let records = dump(path, kind, skip, limit)?;

    match format {
        "json" => print_json(&records)?,
        _ => print_text_output(&records),
    }
    Ok(())
}

/// Reads up to `limit` records after skipping `skip`.
pub fn dump(
    path: &Path,
    kind: ContainerKind,
    skip: usize,
    limit: Option<usize>,
) -> CliResult<Vec<RecordInfo>> {
    let max_records = limit.unwrap_or(usize::MAX);
    let mut records = Vec::new();
    let mut index = 0;

    match kind {
        ContainerKind::RecordIo => {
            let mut reader = RecordIoReader::open(path)?;
            while records.len() < max_records {
                let offset = reader.offset();
                let Some(record) = reader.next_raw()? else {
                    break;
                };
                if index >= skip {
                    records.push(RecordInfo {
                        index,
                        offset,
                        size: record.payload.len(),
                        label: Some(record.header.label),
                        id0: Some(record.header.id0),
                        id1: Some(record.header.id1),
                        features: None,
                    });
                }
                index += 1;
            }
            reader.close()?;
        }
        ContainerKind::TfRecord => {
            let mut reader = TfRecordReader::open(path)?;
            while records.len() < max_records {
                let offset = reader.offset();
                let Some(frame) = reader.next_frame()? else {
                    break;
                };
                if index >= skip {
                    records.push(RecordInfo {
                        index,
                        offset,
                        size: frame.len(),
                        label: None,
                        id0: None,
                        id1: None,
                        features: Some(summarize(&frame)),
                    });
                }
                index += 1;
            }
            reader.close()?;
        }
    }

    Ok(records)
}

fn summarize(frame: &[u8]) -> BTreeMap<String, String> {
    let Ok(features) = FeatureRecord::decode(frame) else {
        return BTreeMap::from([("<error>".to_string(), "not an Example".to_string())]);
    };
    features
        .keys()
        .into_iter()
        .filter_map(|key| {
            features
                .get(key)
                .map(|value| (key.to_string(), describe(value)))
        })
        .collect()
}

// Short values are printed in full, long ones by kind and length.
fn describe(value: &FeatureValue) -> String {
    const INLINE: usize = 4;
    match value {
        FeatureValue::Int64List(v) if v.len() <= INLINE => format!("int64 {v:?}"),
        FeatureValue::FloatList(v) if v.len() <= INLINE => format!("float {v:?}"),
        FeatureValue::BytesList(v) if v.len() == 1 && v[0].len() <= 64 => {
            match std::str::from_utf8(&v[0]) {
                Ok(text) => format!("bytes {text:?}"),
                Err(_) => format!("bytes <{} bytes>", v[0].len()),
            }
        }
        FeatureValue::BytesList(v) if v.len() == 1 => format!("bytes <{} bytes>", v[0].len()),
        other => format!("{} x{}", other.kind(), other.len()),
    }
}

fn print_text_output(records: &[RecordInfo]) {
    for record in records {
        print!(
            "#{:<6} offset={:<10} size={:<8}",
            record.index, record.offset, record.size
        );
        if let (Some(label), Some(id0), Some(id1)) = (record.label, record.id0, record.id1) {
            print!(" label={label} id0={id0} id1={id1}");
        }
        println!();
        if let Some(features) = &record.features {
            for (key, value) in features {
                println!("    {key}: {value}");
            }
        }
    }
    println!();
    println!("Total: {} records", records.len());
}
