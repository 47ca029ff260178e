//! CLI command implementations.

pub mod datasets;
pub mod dump;
pub mod index;
pub mod inspect;
pub mod verify;

use recset_core::recordio::RECORDIO_MAGIC;
use recset_storage::{FileBackend, StorageBackend};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Result type shared by the commands.
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Container format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Magic-prefixed RecordIO stream.
    RecordIo,
    /// Length-framed TFRecord stream.
    TfRecord,
}

impl ContainerKind {
    /// Resolves `kind` (`auto`, `recordio` or `tfrecord`) for `path`.
    ///
    /// `auto` sniffs the RecordIO magic and falls back to TFRecord.
    pub fn resolve(kind: &str, path: &Path) -> CliResult<Self> {
        match kind {
            "recordio" | "rec" => Ok(Self::RecordIo),
            "tfrecord" => Ok(Self::TfRecord),
            "auto" => Self::sniff(path),
            other => Err(format!("unknown container kind {other:?}").into()),
        }
    }

    fn sniff(path: &Path) -> CliResult<Self> {
        let backend = FileBackend::open(path)?;
        if backend.size()? < 4 {
            return Ok(Self::TfRecord);
        }
        let head = backend.read_at(0, 4)?;
        let magic = u32::from_le_bytes([head[0], head[1], head[2], head[3]]);
        let kind = if magic == RECORDIO_MAGIC {
            Self::RecordIo
        } else {
            Self::TfRecord
        };
        debug!(
            path = %path.display(),
            magic = format_args!("{magic:#010x}"),
            kind = kind.as_str(),
            "sniffed container kind"
        );
        Ok(kind)
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RecordIo => "recordio",
            Self::TfRecord => "tfrecord",
        }
    }
}

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recset_testkit::prelude::*;

    #[test]
    fn sniffs_container_kind() {
        with_test_dir(|dir| {
            let rec = dir.write("a.rec", RecordIoBuilder::new().record(1.0, 0, 1, b"x").build());
            let tf = dir.write("a.tfrecord", TfRecordBuilder::new().frame(b"x").build());
            let empty = dir.write("empty", b"");

            assert_eq!(ContainerKind::resolve("auto", &rec).unwrap(), ContainerKind::RecordIo);
            assert_eq!(ContainerKind::resolve("auto", &tf).unwrap(), ContainerKind::TfRecord);
            assert_eq!(ContainerKind::resolve("auto", &empty).unwrap(), ContainerKind::TfRecord);
            assert_eq!(ContainerKind::resolve("recordio", &tf).unwrap(), ContainerKind::RecordIo);
            assert!(ContainerKind::resolve("zip", &tf).is_err());
        });
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
