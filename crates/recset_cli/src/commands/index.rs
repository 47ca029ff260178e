//! Index command implementation.

use super::{print_json, CliResult};
use recset_core::{RecordIndex, RecordIoReader};
use recset_storage::{FileBackend, RangeBackend};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// One listing entry.
#[derive(Debug, Serialize)]
pub struct IndexEntry {
    /// Record name.
    pub name: String,
    /// Start offset.
    pub start: u64,
    /// End offset.
    pub end: u64,
    /// Problem found when checking against the data file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the index command.
pub fn run(listing: &Path, data: Option<&Path>, format: &str) -> CliResult<()> {
    let entries = entries(listing, data)?;
    let failures = entries.iter().filter(|e| e.error.is_some()).count();

    match format {
        "json" => print_json(&entries)?,
        _ => {
            for entry in &entries {
                print!("{:>12} {:>12}  {}", entry.start, entry.end, entry.name);
                match &entry.error {
                    Some(error) => println!("  ✗ {error}"),
                    None => println!(),
                }
            }
            println!();
            println!("Total: {} entries", entries.len());
        }
    }

    if failures > 0 {
        return Err(format!("{failures} entries do not match the data file").into());
    }
    Ok(())
}

/// Lists the index entries, checking each range against `data` if given.
pub fn entries(listing: &Path, data: Option<&Path>) -> CliResult<Vec<IndexEntry>> {
    let index = RecordIndex::build(listing)?;
    let data = data.map(FileBackend::open).transpose()?.map(Arc::new);

    let mut entries = Vec::with_capacity(index.len());
    for name in index.list() {
        let range = index.lookup(name)?;
        let error = data
            .as_ref()
            .and_then(|data| check_range(data, range.start, range.end).err());
        entries.push(IndexEntry {
            name: name.clone(),
            start: range.start,
            end: range.end,
            error,
        });
    }
    Ok(entries)
}

// A listed range must hold exactly one well-formed record.
fn check_range(data: &Arc<FileBackend>, start: u64, end: u64) -> Result<(), String> {
    let window = RangeBackend::new(Arc::clone(data), start, end).map_err(|e| e.to_string())?;
    let mut reader = RecordIoReader::new(window);
    match reader.next_raw() {
        Ok(Some(_)) => {}
        Ok(None) => return Err("empty range".to_string()),
        Err(e) => return Err(e.to_string()),
    }
    match reader.next_raw() {
        Ok(None) => Ok(()),
        Ok(Some(_)) => Err("range holds more than one record".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
