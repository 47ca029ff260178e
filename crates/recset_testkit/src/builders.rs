//! Container builders.
//!
//! The library crates only read containers. These builders write the same
//! byte layouts so tests can produce well-formed and deliberately broken
//! inputs without checked-in binary files.

use prost::Message;
use recset_codec::{masked_crc32c, proto};
use std::collections::HashMap;

/// RecordIO sync marker.
pub const RECORDIO_MAGIC: u32 = 0xced7_230a;

/// Size of the RecordIO sub-header (record flag, label, id0, id1).
pub const RECORDIO_SUB_HEADER: usize = 24;

/// Fields of one RecordIO record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSpec {
    /// Label value.
    pub label: f32,
    /// Reserved id.
    pub id0: u64,
    /// Record id.
    pub id1: u64,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

impl RecordSpec {
    /// Creates a record spec.
    pub fn new(label: f32, id0: u64, id1: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            label,
            id0,
            id1,
            payload: payload.into(),
        }
    }

    /// Encodes this record with a zero flag.
    pub fn encode(&self) -> Vec<u8> {
        let length = (RECORDIO_SUB_HEADER + self.payload.len()) as u32;
        encode_recordio(length, self)
    }
}

/// Encodes one RecordIO record using `word` verbatim as the flag/length
/// word. Padding follows the low 29 bits of `word`.
pub fn encode_recordio(word: u32, spec: &RecordSpec) -> Vec<u8> {
    let length = word & ((1 << 29) - 1);
    let padding = ((length + 3) & !3) - length;

    let mut buf = Vec::with_capacity(8 + RECORDIO_SUB_HEADER + spec.payload.len() + 3);
    buf.extend_from_slice(&RECORDIO_MAGIC.to_le_bytes());
    buf.extend_from_slice(&word.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&spec.label.to_le_bytes());
    buf.extend_from_slice(&spec.id0.to_le_bytes());
    buf.extend_from_slice(&spec.id1.to_le_bytes());
    buf.extend_from_slice(&spec.payload);
    buf.resize(buf.len() + padding as usize, 0);
    buf
}

/// Builds a RecordIO stream and records where each record starts and ends.
#[derive(Debug, Clone, Default)]
pub struct RecordIoBuilder {
    buf: Vec<u8>,
    ranges: Vec<(u64, u64)>,
}

impl RecordIoBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a well-formed record.
    pub fn record(self, label: f32, id0: u64, id1: u64, payload: &[u8]) -> Self {
        self.push(&RecordSpec::new(label, id0, id1, payload))
    }

    /// Appends a well-formed record from a spec.
    pub fn push(mut self, spec: &RecordSpec) -> Self {
        let bytes = spec.encode();
        self.append(&bytes);
        self
    }

    /// Appends a record with a multi-part flag set in the top bits.
    pub fn record_with_flag(mut self, flag: u32, spec: &RecordSpec) -> Self {
        let length = (RECORDIO_SUB_HEADER + spec.payload.len()) as u32;
        let bytes = encode_recordio((flag << 29) | length, spec);
        self.append(&bytes);
        self
    }

    /// Appends arbitrary bytes, tracked as one range.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.append(bytes);
        self
    }

    /// Byte range `[start, end)` of every appended piece.
    pub fn ranges(&self) -> &[(u64, u64)] {
        &self.ranges
    }

    /// Listing text for the appended pieces, named in order from `names`.
    pub fn listing(&self, names: &[&str]) -> String {
        let entries: Vec<(u64, u64, &str)> = self
            .ranges
            .iter()
            .zip(names)
            .map(|(&(start, end), &name)| (start, end, name))
            .collect();
        listing(&entries)
    }

    /// Returns the stream bytes.
    pub fn build(self) -> Vec<u8> {
        self.buf
    }

    fn append(&mut self, bytes: &[u8]) {
        let start = self.buf.len() as u64;
        self.buf.extend_from_slice(bytes);
        self.ranges.push((start, self.buf.len() as u64));
    }
}

/// Formats listing lines `start end <index> name`.
pub fn listing(entries: &[(u64, u64, &str)]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, (start, end, name))| format!("{start} {end} {i} {name}\n"))
        .collect()
}

/// Builds a TFRecord stream.
#[derive(Debug, Clone, Default)]
pub struct TfRecordBuilder {
    buf: Vec<u8>,
}

impl TfRecordBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a frame holding `data` with correct checksums.
    pub fn frame(mut self, data: &[u8]) -> Self {
        let len = (data.len() as u64).to_le_bytes();
        self.buf.extend_from_slice(&len);
        self.buf.extend_from_slice(&masked_crc32c(&len).to_le_bytes());
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(&masked_crc32c(data).to_le_bytes());
        self
    }

    /// Appends a frame holding an encoded example.
    pub fn example(self, example: &proto::Example) -> Self {
        self.frame(&example.encode_to_vec())
    }

    /// Appends arbitrary bytes.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Returns the stream bytes.
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Builds a protobuf `Example`.
#[derive(Debug, Clone, Default)]
pub struct ExampleBuilder {
    features: HashMap<String, proto::Feature>,
}

impl ExampleBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an integer list.
    pub fn int64s(self, key: &str, values: &[i64]) -> Self {
        self.with(
            key,
            proto::feature::Kind::Int64List(proto::Int64List {
                value: values.to_vec(),
            }),
        )
    }

    /// Sets a single integer.
    pub fn int64(self, key: &str, value: i64) -> Self {
        self.int64s(key, &[value])
    }

    /// Sets a float list.
    pub fn floats(self, key: &str, values: &[f32]) -> Self {
        self.with(
            key,
            proto::feature::Kind::FloatList(proto::FloatList {
                value: values.to_vec(),
            }),
        )
    }

    /// Sets a single byte string.
    pub fn bytes(self, key: &str, value: &[u8]) -> Self {
        self.with(
            key,
            proto::feature::Kind::BytesList(proto::BytesList {
                value: vec![value.to_vec()],
            }),
        )
    }

    /// Sets a single string.
    pub fn string(self, key: &str, value: &str) -> Self {
        self.bytes(key, value.as_bytes())
    }

    /// Sets a string list.
    pub fn strings(self, key: &str, values: &[&str]) -> Self {
        self.with(
            key,
            proto::feature::Kind::BytesList(proto::BytesList {
                value: values.iter().map(|s| s.as_bytes().to_vec()).collect(),
            }),
        )
    }

    /// Returns the example.
    pub fn build(self) -> proto::Example {
        proto::Example {
            features: Some(proto::Features {
                feature: self.features,
            }),
        }
    }

    /// Returns the encoded example.
    pub fn encode(self) -> Vec<u8> {
        self.build().encode_to_vec()
    }

    fn with(mut self, key: &str, kind: proto::feature::Kind) -> Self {
        self.features
            .insert(key.to_string(), proto::Feature { kind: Some(kind) });
        self
    }
}

/// One object of a detection example.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSpec {
    /// Left edge.
    pub xmin: f32,
    /// Right edge.
    pub xmax: f32,
    /// Top edge.
    pub ymin: f32,
    /// Bottom edge.
    pub ymax: f32,
    /// Class name.
    pub text: String,
    /// Class index.
    pub label: i64,
}

impl BoxSpec {
    /// Creates a box.
    pub fn new(xmin: f32, xmax: f32, ymin: f32, ymax: f32, text: &str, label: i64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            text: text.to_string(),
            label,
        }
    }
}

/// Example in the image-classification schema.
pub fn classification_example(
    id: i64,
    label: i64,
    encoded: &[u8],
    format: &str,
    width: i64,
    height: i64,
) -> ExampleBuilder {
    ExampleBuilder::new()
        .int64("image/id", id)
        .int64("image/class/label", label)
        .bytes("image/encoded", encoded)
        .string("image/format", format)
        .int64("image/width", width)
        .int64("image/height", height)
}

/// Example in the object-detection schema with the required box arrays.
pub fn detection_example(
    filename: &str,
    encoded: &[u8],
    width: i64,
    height: i64,
    boxes: &[BoxSpec],
) -> ExampleBuilder {
    let texts: Vec<&str> = boxes.iter().map(|b| b.text.as_str()).collect();
    let labels: Vec<i64> = boxes.iter().map(|b| b.label).collect();
    ExampleBuilder::new()
        .int64("image/height", height)
        .int64("image/width", width)
        .string("image/filename", filename)
        .string("image/source_id", filename)
        .string("image/key/sha256", "00")
        .string("image/format", "png")
        .bytes("image/encoded", encoded)
        .floats(
            "image/object/bbox/xmin",
            &boxes.iter().map(|b| b.xmin).collect::<Vec<_>>(),
        )
        .floats(
            "image/object/bbox/xmax",
            &boxes.iter().map(|b| b.xmax).collect::<Vec<_>>(),
        )
        .floats(
            "image/object/bbox/ymin",
            &boxes.iter().map(|b| b.ymin).collect::<Vec<_>>(),
        )
        .floats(
            "image/object/bbox/ymax",
            &boxes.iter().map(|b| b.ymax).collect::<Vec<_>>(),
        )
        .strings("image/object/class/text", &texts)
        .int64s("image/object/class/label", &labels)
}
