//! Decoded record types.

use crate::annotation::{BoundingBox, ImageMetadata};
use crate::raster::RgbImage;

/// A decoded image record.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Record id.
    pub id: u64,
    /// Numeric class label.
    pub label_index: f32,
    /// Decoded raster.
    pub image: RgbImage,
}

/// An image record read from a segmentation dataset.
///
/// Shares every field with [`ImageRecord`] and forwards to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSegmentationRecord {
    record: ImageRecord,
}

impl ImageSegmentationRecord {
    /// Wraps a decoded record.
    #[must_use]
    pub fn new(record: ImageRecord) -> Self {
        Self { record }
    }

    /// Record id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.record.id
    }

    /// Numeric class label.
    #[must_use]
    pub fn label_index(&self) -> f32 {
        self.record.label_index
    }

    /// Decoded raster.
    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.record.image
    }

    /// Returns the wrapped record.
    #[must_use]
    pub fn into_inner(self) -> ImageRecord {
        self.record
    }
}

impl From<ImageRecord> for ImageSegmentationRecord {
    fn from(record: ImageRecord) -> Self {
        Self::new(record)
    }
}

/// A classified image with its label resolved to text.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledImage {
    /// Human-readable label.
    pub label: String,
    /// Superclass label, for datasets with a two-level hierarchy.
    pub coarse_label: Option<String>,
    /// The decoded record.
    pub record: ImageRecord,
}

/// A decoded image with its object annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionImage {
    /// Image-level metadata.
    pub metadata: ImageMetadata,
    /// One entry per annotated object.
    pub boxes: Vec<BoundingBox>,
    /// Decoded raster.
    pub image: RgbImage,
}

/// What a dataset yields per record.
#[derive(Debug, Clone, PartialEq)]
pub enum LabeledData {
    /// A classified image.
    Image(LabeledImage),
    /// An image with bounding boxes.
    Detection(DetectionImage),
}

impl LabeledData {
    /// Label of the image, or of the first box for detections.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Image(img) => Some(&img.label),
            Self::Detection(det) => det.boxes.first().map(|b| b.label.as_str()),
        }
    }

    /// Decoded raster.
    #[must_use]
    pub fn image(&self) -> &RgbImage {
        match self {
            Self::Image(img) => &img.record.image,
            Self::Detection(det) => &det.image,
        }
    }
}
