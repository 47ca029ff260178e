//! Random-access index over a RecordIO data file.
//!
//! A listing file names every record of a data file together with its byte
//! range:
//!
//! ```text
//! 0 15868 0 ILSVRC2012_val_00000001.JPEG
//! 15868 33516 1 ILSVRC2012_val_00000002.JPEG
//! ```
//!
//! The first two fields are the start and end offsets, the last field is
//! the name. Anything in between is ignored.

use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Byte range `[start, end)` of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRange {
    /// Offset of the first byte.
    pub start: u64,
    /// Offset one past the last byte.
    pub end: u64,
}

impl RecordRange {
    /// Number of bytes in the range.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns whether the range is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Name to byte-range map built from a listing file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordIndex {
    names: Vec<String>,
    ranges: HashMap<String, RecordRange>,
}

impl RecordIndex {
    /// Reads and parses a listing file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`CoreError::InvalidListing`] for a malformed line.
    pub fn build(listing_path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = listing_path.as_ref();
        let text = fs::read_to_string(path)?;
        let index = Self::parse(&text)?;
        debug!(path = %path.display(), entries = index.len(), "built record index");
        Ok(index)
    }

    /// Parses listing text.
    ///
    /// Blank lines are skipped. A name listed twice keeps its first position
    /// in [`list`](Self::list) and the range of its last line.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidListing`] if a line has fewer than three
    /// fields, a non-numeric offset, or a start past its end.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let mut index = Self::default();

        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 3 {
                return Err(CoreError::invalid_listing(
                    line_no,
                    format!("expected at least 3 fields, found {}", fields.len()),
                ));
            }

            let start = parse_offset(fields[0], line_no, "start")?;
            let end = parse_offset(fields[1], line_no, "end")?;
            if start > end {
                return Err(CoreError::invalid_listing(
                    line_no,
                    format!("start offset {start} is past end offset {end}"),
                ));
            }

            let name = fields[fields.len() - 1];
            if index
                .ranges
                .insert(name.to_string(), RecordRange { start, end })
                .is_none()
            {
                index.names.push(name.to_string());
            }
        }

        Ok(index)
    }

    /// Record names in listing order.
    #[must_use]
    pub fn list(&self) -> &[String] {
        &self.names
    }

    /// Returns the range of `name`, if listed.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<RecordRange> {
        self.ranges.get(name).copied()
    }

    /// Returns the range of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if `name` is not listed.
    pub fn lookup(&self, name: &str) -> CoreResult<RecordRange> {
        self.get(name).ok_or_else(|| CoreError::not_found(name))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn parse_offset(field: &str, line: usize, which: &str) -> CoreResult<u64> {
    field.parse().map_err(|_| {
        CoreError::invalid_listing(line, format!("{which} offset {field:?} is not a number"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use recset_testkit::prelude::*;

    #[test]
    fn parses_listing_in_order() {
        let index = RecordIndex::parse("0 100 ... a.jpg\n100 250 ... b.jpg").unwrap();
        assert_eq!(index.list(), &["a.jpg".to_string(), "b.jpg".to_string()]);
        assert_eq!(index.get("a.jpg"), Some(RecordRange { start: 0, end: 100 }));
        assert_eq!(
            index.lookup("b.jpg").unwrap(),
            RecordRange {
                start: 100,
                end: 250
            }
        );
        assert_eq!(index.lookup("b.jpg").unwrap().len(), 150);
    }

    #[test]
    fn tolerates_blank_and_trailing_lines() {
        let index = RecordIndex::parse("\n0 4 0 a\n\n4 8 1 b\n\n").unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn empty_listing() {
        let index = RecordIndex::parse("  \n").unwrap();
        assert!(index.is_empty());
        assert!(index.list().is_empty());
    }

    #[test]
    fn missing_name_is_not_found() {
        let index = RecordIndex::parse("0 1 0 a").unwrap();
        assert!(index.get("z").is_none());
        assert!(matches!(
            index.lookup("z"),
            Err(CoreError::NotFound { name }) if name == "z"
        ));
    }

    #[test]
    fn duplicate_name_last_range_wins() {
        let index = RecordIndex::parse("0 1 0 a\n1 2 1 b\n5 9 2 a").unwrap();
        assert_eq!(index.list(), &["a".to_string(), "b".to_string()]);
        assert_eq!(index.get("a"), Some(RecordRange { start: 5, end: 9 }));
    }

    #[test]
    fn rejects_malformed_lines() {
        let cases = [
            ("0 1", 1),
            ("0 1 0 a\nx 1 0 b", 2),
            ("0 1 0 a\n1 -2 0 b", 2),
            ("0 1 0 a\n4 2 0 b", 2),
        ];
        for (text, line) in cases {
            match RecordIndex::parse(text) {
                Err(CoreError::InvalidListing { line: got, .. }) => assert_eq!(got, line, "{text}"),
                other => panic!("expected invalid listing for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn build_reads_file() {
        with_test_dir(|dir| {
            let path = dir.write("val.lst", "0 100 0 a.jpg\n100 250 1 b.jpg\n");
            let first = RecordIndex::build(&path).unwrap();
            let second = RecordIndex::build(&path).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.len(), 2);
        });
    }

    #[test]
    fn build_missing_file() {
        with_test_dir(|dir| {
            let err = RecordIndex::build(dir.path().join("absent.lst")).unwrap_err();
            assert!(matches!(err, CoreError::Io(_)));
        });
    }

    proptest! {
        #[test]
        fn listing_round_trips(
            names in prop::collection::hash_set(record_name_strategy(), 0..20)
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let mut entries = Vec::new();
            let mut offset = 0u64;
            for (i, name) in names.iter().enumerate() {
                let end = offset + 4 * (i as u64 + 1);
                entries.push((offset, end, name.as_str()));
                offset = end;
            }

            let index = RecordIndex::parse(&listing(&entries)).unwrap();
            prop_assert_eq!(index.list(), names.as_slice());
            for (start, end, name) in entries {
                prop_assert_eq!(index.get(name), Some(RecordRange { start, end }));
            }
        }
    }
}
