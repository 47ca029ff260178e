//! Object-detection annotations assembled from feature records.
//!
//! A detection example stores one value per image plus parallel arrays with
//! one entry per object. [`DetectionRecord::from_features`] zips the arrays
//! into [`BoundingBox`] values after checking that their lengths agree.

use crate::error::{CoreError, CoreResult};
use crate::raster::ImageDecoder;
use crate::record::DetectionImage;
use recset_codec::FeatureRecord;

/// Feature keys of the object-detection schema.
pub mod keys {
    /// Image height in pixels.
    pub const HEIGHT: &str = "image/height";
    /// Image width in pixels.
    pub const WIDTH: &str = "image/width";
    /// Original file name.
    pub const FILENAME: &str = "image/filename";
    /// Source identifier.
    pub const SOURCE_ID: &str = "image/source_id";
    /// Hex SHA-256 of the encoded image.
    pub const SHA256: &str = "image/key/sha256";
    /// Encoding of `image/encoded`.
    pub const FORMAT: &str = "image/format";
    /// Encoded image bytes.
    pub const ENCODED: &str = "image/encoded";
    /// Box left edges.
    pub const XMIN: &str = "image/object/bbox/xmin";
    /// Box right edges.
    pub const XMAX: &str = "image/object/bbox/xmax";
    /// Box top edges.
    pub const YMIN: &str = "image/object/bbox/ymin";
    /// Box bottom edges.
    pub const YMAX: &str = "image/object/bbox/ymax";
    /// Class names.
    pub const CLASS_TEXT: &str = "image/object/class/text";
    /// Class indexes.
    pub const CLASS_LABEL: &str = "image/object/class/label";
    /// Crowd flags.
    pub const IS_CROWD: &str = "image/object/is_crowd";
    /// Object areas.
    pub const AREA: &str = "image/object/area";
    /// Difficulty flags.
    pub const DIFFICULT: &str = "image/object/difficult";
    /// Truncation flags.
    pub const TRUNCATED: &str = "image/object/truncated";
    /// Pose names.
    pub const VIEW: &str = "image/object/view";
}

/// Image-level fields of a detection record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Width in pixels.
    pub width: i64,
    /// Height in pixels.
    pub height: i64,
    /// Original file name.
    pub file_name: String,
    /// Source identifier.
    pub source_id: String,
    /// Hex SHA-256 of the encoded image.
    pub sha256: String,
    /// Encoding of the image bytes, e.g. `jpeg`.
    pub format: String,
}

/// One annotated object.
///
/// Coordinates are normalized to `[0, 1]`. Optional fields are `None` when
/// the record has no array for them.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    /// Left edge.
    pub xmin: f32,
    /// Right edge.
    pub xmax: f32,
    /// Top edge.
    pub ymin: f32,
    /// Bottom edge.
    pub ymax: f32,
    /// Class name.
    pub label: String,
    /// Class index.
    pub class_index: Option<i64>,
    /// Whether the box covers a crowd.
    pub is_crowd: Option<bool>,
    /// Object area.
    pub area: Option<f32>,
    /// Whether the object is hard to recognize.
    pub difficult: Option<bool>,
    /// Whether the object is cut off.
    pub truncated: Option<bool>,
    /// Pose name.
    pub pose: Option<String>,
}

/// A detection example before its image is decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    /// Image-level metadata.
    pub metadata: ImageMetadata,
    /// Encoded image bytes.
    pub encoded_image: Vec<u8>,
    /// One entry per object.
    pub boxes: Vec<BoundingBox>,
}

impl DetectionRecord {
    /// Assembles a detection record from `features`.
    ///
    /// The number of boxes is the length of `image/object/bbox/xmin`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AnnotationMismatch`] if a required box array
    /// (`xmax`, `ymin`, `ymax`, class text) or a present optional array has
    /// a different length.
    pub fn from_features(features: &FeatureRecord) -> CoreResult<Self> {
        let metadata = ImageMetadata {
            width: features.get_int64(keys::WIDTH),
            height: features.get_int64(keys::HEIGHT),
            file_name: features.get_string(keys::FILENAME),
            source_id: features.get_string(keys::SOURCE_ID),
            sha256: features.get_string(keys::SHA256),
            format: features.get_string(keys::FORMAT),
        };

        let xmin = features.get_float_list(keys::XMIN);
        let count = xmin.len();

        let xmax = required(keys::XMAX, features.get_float_list(keys::XMAX), count)?;
        let ymin = required(keys::YMIN, features.get_float_list(keys::YMIN), count)?;
        let ymax = required(keys::YMAX, features.get_float_list(keys::YMAX), count)?;
        let text = features.get_string_list(keys::CLASS_TEXT);
        let text = required(keys::CLASS_TEXT, text.as_slice(), count)?;

        let class_label = optional(
            keys::CLASS_LABEL,
            features.get_int64_list(keys::CLASS_LABEL),
            count,
        )?;
        let is_crowd = optional(keys::IS_CROWD, features.get_int64_list(keys::IS_CROWD), count)?;
        let area = optional(keys::AREA, features.get_float_list(keys::AREA), count)?;
        let difficult = optional(
            keys::DIFFICULT,
            features.get_int64_list(keys::DIFFICULT),
            count,
        )?;
        let truncated = optional(
            keys::TRUNCATED,
            features.get_int64_list(keys::TRUNCATED),
            count,
        )?;
        let view = features.get_string_list(keys::VIEW);
        let view = optional(keys::VIEW, view.as_slice(), count)?;

        let boxes = (0..count)
            .map(|i| BoundingBox {
                xmin: xmin[i],
                xmax: xmax[i],
                ymin: ymin[i],
                ymax: ymax[i],
                label: text[i].clone(),
                class_index: class_label.map(|v| v[i]),
                is_crowd: is_crowd.map(|v| v[i] == 1),
                area: area.map(|v| v[i]),
                difficult: difficult.map(|v| v[i] == 1),
                truncated: truncated.map(|v| v[i] == 1),
                pose: view.map(|v| v[i].clone()),
            })
            .collect();

        Ok(Self {
            metadata,
            encoded_image: features.get_bytes(keys::ENCODED).to_vec(),
            boxes,
        })
    }

    /// Decodes the image and returns the annotated result.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error if the image is not RGB.
    pub fn decode_image(self, decoder: &dyn ImageDecoder) -> CoreResult<DetectionImage> {
        let image = decoder.decode(&self.encoded_image)?;
        Ok(DetectionImage {
            metadata: self.metadata,
            boxes: self.boxes,
            image,
        })
    }
}

fn required<'a, T>(field: &str, values: &'a [T], count: usize) -> CoreResult<&'a [T]> {
    if values.len() == count {
        Ok(values)
    } else {
        Err(CoreError::annotation_mismatch(field, count, values.len()))
    }
}

// An absent or empty array means the field is not annotated.
fn optional<'a, T>(field: &str, values: &'a [T], count: usize) -> CoreResult<Option<&'a [T]>> {
    if values.is_empty() && count > 0 {
        return Ok(None);
    }
    required(field, values, count).map(Some)
}
