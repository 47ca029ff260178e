//! TFRecord containers of protobuf `Example` messages.
//!
//! ```text
//! ┌────────────┬─────────────────┬────────────┬───────────────┐
//! │ length u64 │ masked crc(len) │ data bytes │ masked crc(d) │
//! └────────────┴─────────────────┴────────────┴───────────────┘
//! ```
//!
//! All integers are little-endian.

mod frame;
mod reader;

pub use frame::{verify_crc, FrameHeader, FRAME_FOOTER_SIZE, FRAME_HEADER_SIZE};
pub use reader::TfRecordReader;

use crate::error::{CoreError, CoreResult};
use crate::raster::{planar_to_rgb, ImageDecoder};
use crate::record::ImageRecord;
use recset_codec::FeatureRecord;

/// Feature keys of the image-classification schema.
pub mod keys {
    /// Record id.
    pub const ID: &str = "image/id";
    /// Class index.
    pub const LABEL: &str = "image/class/label";
    /// Image bytes.
    pub const ENCODED: &str = "image/encoded";
    /// Encoding of `image/encoded`; `cifar` means raw planar pixels.
    pub const FORMAT: &str = "image/format";
    /// Height in pixels.
    pub const HEIGHT: &str = "image/height";
    /// Width in pixels.
    pub const WIDTH: &str = "image/width";
}

/// Format tag of raw planar RGB pixels.
pub const PLANAR_FORMAT: &str = "cifar";

/// Builds an [`ImageRecord`] from an image-classification example.
///
/// # Errors
///
/// Returns [`CoreError::ImageDecode`] for bad planar dimensions, or the
/// decoder's error for encoded images.
pub fn image_record_from_features(
    features: &FeatureRecord,
    decoder: &dyn ImageDecoder,
) -> CoreResult<ImageRecord> {
    let encoded = features.get_bytes(keys::ENCODED);
    let format = features.get_string(keys::FORMAT);

    let image = if format.eq_ignore_ascii_case(PLANAR_FORMAT) {
        let width = dimension(features, keys::WIDTH)?;
        let height = dimension(features, keys::HEIGHT)?;
        planar_to_rgb(encoded, width, height)?
    } else {
        decoder.decode(encoded)?
    };

    Ok(ImageRecord {
        id: features.get_int64(keys::ID) as u64,
        label_index: features.get_int64(keys::LABEL) as f32,
        image,
    })
}

fn dimension(features: &FeatureRecord, key: &str) -> CoreResult<u32> {
    let value = features.get_int64(key);
    u32::try_from(value)
        .map_err(|_| CoreError::image_decode(format!("{key} out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::StandardImageDecoder;
    use recset_testkit::prelude::*;

    fn features(builder: ExampleBuilder) -> FeatureRecord {
        FeatureRecord::decode(&builder.encode()).unwrap()
    }

    #[test]
    fn negative_dimension_rejected() {
        let rec = features(classification_example(1, 0, &[0; 12], "cifar", -2, 2));
        let err = image_record_from_features(&rec, &StandardImageDecoder).unwrap_err();
        assert!(matches!(err, CoreError::ImageDecode { .. }));
    }

    #[test]
    fn oversized_planar_dimensions_rejected() {
        let max = i64::from(u32::MAX);
        let rec = features(classification_example(1, 0, &[0; 12], "cifar", max, max));
        let err = image_record_from_features(&rec, &StandardImageDecoder).unwrap_err();
        assert!(matches!(err, CoreError::ImageDecode { .. }));
    }

    #[test]
    fn planar_size_mismatch() {
        let rec = features(classification_example(1, 0, &[0; 10], "cifar", 2, 2));
        assert!(image_record_from_features(&rec, &StandardImageDecoder).is_err());
    }

    #[test]
    fn grayscale_png_rejected() {
        let rec = features(classification_example(1, 0, &gray_png(3, 3), "png", 3, 3));
        let err = image_record_from_features(&rec, &StandardImageDecoder).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedImageLayout { .. }));
    }
}
