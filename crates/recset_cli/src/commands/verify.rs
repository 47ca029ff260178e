//! Verify command implementation.

use super::{CliResult, ContainerKind};
use recset_codec::FeatureRecord;
use recset_core::tfrecord::image_record_from_features;
use recset_core::{ImageDecoder, RecordIoReader, StandardImageDecoder, TfRecordReader};
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of records checked.
    pub records_checked: usize,
    /// Number of valid records.
    pub valid_records: usize,
    /// Number of records whose content failed to decode.
    pub corrupt_records: usize,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    /// Returns whether nothing failed.
    pub fn is_ok(&self) -> bool {
        self.corrupt_records == 0 && self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path, kind: &str, decode_images: bool) -> CliResult<()> {
    let kind = ContainerKind::resolve(kind, path)?;
    println!("Verifying {} container at {:?}", kind.as_str(), path);
    println!();

    let result = verify(path, kind, decode_images.then_some(&StandardImageDecoder))?;
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Container verification passed");
        Ok(())
    } else {
        println!("✗ Container verification failed");
        Err("Verification failed".into())
    }
}

/// Reads every record of a container, optionally decoding images.
///
/// Framing errors end the scan; content errors are counted per record.
pub fn verify(
    path: &Path,
    kind: ContainerKind,
    decoder: Option<&dyn ImageDecoder>,
) -> CliResult<VerifyResult> {
    let mut result = VerifyResult::default();

    match kind {
        ContainerKind::RecordIo => {
            let mut reader = RecordIoReader::open(path)?;
            loop {
                let offset = reader.offset();
                let record = match reader.next_raw() {
                    Ok(Some(record)) => record,
                    Ok(None) => break,
                    Err(e) => {
                        result.errors.push(format!("offset {offset}: {e}"));
                        break;
                    }
                };
                result.records_checked += 1;
                match decoder.map(|d| d.decode(&record.payload)) {
                    Some(Err(e)) => {
                        result.corrupt_records += 1;
                        result.errors.push(format!("record {}: {e}", record.id()));
                    }
                    _ => result.valid_records += 1,
                }
            }
            reader.close()?;
        }
        ContainerKind::TfRecord => {
            let mut reader = TfRecordReader::open(path)?;
            loop {
                let offset = reader.offset();
                let frame = match reader.next_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => break,
                    Err(e) => {
                        result.errors.push(format!("offset {offset}: {e}"));
                        break;
                    }
                };
                result.records_checked += 1;
                let checked = FeatureRecord::decode(&frame)
                    .map_err(|e| e.to_string())
                    .and_then(|features| match decoder {
                        Some(d) => image_record_from_features(&features, d)
                            .map(|_| ())
                            .map_err(|e| e.to_string()),
                        None => Ok(()),
                    });
                match checked {
                    Ok(()) => result.valid_records += 1,
                    Err(e) => {
                        result.corrupt_records += 1;
                        result.errors.push(format!("offset {offset}: {e}"));
                    }
                }
            }
            reader.close()?;
        }
    }

    Ok(result)
}

fn print_result(result: &VerifyResult) {
    println!("  Records checked: {}", result.records_checked);
    println!("  Valid:           {}", result.valid_records);
    println!("  Corrupt:         {}", result.corrupt_records);

    if !result.errors.is_empty() {
        println!("  Errors:");
        for error in result.errors.iter().take(10) {
            println!("    - {}", error);
        }
        if result.errors.len() > 10 {
            println!("    ... and {} more", result.errors.len() - 10);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recset_testkit::prelude::*;

    #[test]
    fn clean_recordio() {
        with_test_dir(|dir| {
            let bytes = RecordIoBuilder::new()
                .record(1.0, 0, 1, &rgb_png(2, 2))
                .push(&validation_record())
                .build();
            let path = dir.write("ok.rec", bytes);
            let result = verify(&path, ContainerKind::RecordIo, Some(&StandardImageDecoder)).unwrap();
            assert!(result.is_ok());
            assert_eq!(result.valid_records, 2);
        });
    }

    #[test]
    fn undecodable_payload_is_counted() {
        with_test_dir(|dir| {
            let bytes = RecordIoBuilder::new()
                .record(1.0, 0, 1, &gray_png(2, 2))
                .record(1.0, 0, 2, &rgb_png(2, 2))
                .build();
            let path = dir.write("gray.rec", bytes);

            let unchecked = verify(&path, ContainerKind::RecordIo, None).unwrap();
            assert!(unchecked.is_ok());

            let checked = verify(&path, ContainerKind::RecordIo, Some(&StandardImageDecoder)).unwrap();
            assert_eq!(checked.records_checked, 2);
            assert_eq!(checked.corrupt_records, 1);
            assert!(!checked.is_ok());
        });
    }

    #[test]
    fn truncated_recordio_stops() {
        with_test_dir(|dir| {
            let mut bytes = RecordIoBuilder::new()
                .record(1.0, 0, 1, &[7; 16])
                .record(1.0, 0, 2, &[7; 16])
                .build();
            bytes.truncate(bytes.len() - 6);
            let path = dir.write("cut.rec", bytes);

            let result = verify(&path, ContainerKind::RecordIo, None).unwrap();
            assert_eq!(result.records_checked, 1);
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors[0].contains("truncated"));
        });
    }

    #[test]
    fn tfrecord_checksum_error() {
        with_test_dir(|dir| {
            let mut bytes = TfRecordBuilder::new()
                .example(&ExampleBuilder::new().int64("k", 1).build())
                .build();
            let last = bytes.len() - 1;
            bytes[last] ^= 0xff;
            let path = dir.write("bad.tfrecord", bytes);

            let result = verify(&path, ContainerKind::TfRecord, None).unwrap();
            assert!(!result.is_ok());
            assert!(result.errors[0].contains("checksum"));
        });
    }
}
