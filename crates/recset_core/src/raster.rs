//! Image decoding for record payloads.

use crate::error::{CoreError, CoreResult};
use image::DynamicImage;

pub use image::RgbImage;

/// Turns encoded payload bytes into an RGB raster.
///
/// Readers never interpret payload bytes themselves; they hand them to an
/// `ImageDecoder` so callers can swap in their own codec.
pub trait ImageDecoder {
    /// Decodes `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ImageDecode`] if the bytes are not a supported
    /// image, or [`CoreError::UnsupportedImageLayout`] if they decode to
    /// anything other than 8-bit RGB.
    fn decode(&self, bytes: &[u8]) -> CoreResult<RgbImage>;
}

impl<D: ImageDecoder + ?Sized> ImageDecoder for &D {
    fn decode(&self, bytes: &[u8]) -> CoreResult<RgbImage> {
        (**self).decode(bytes)
    }
}

/// Decoder backed by the `image` crate, guessing the format from content.
///
/// Grayscale, RGBA and 16-bit images are rejected rather than converted.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardImageDecoder;

impl ImageDecoder for StandardImageDecoder {
    fn decode(&self, bytes: &[u8]) -> CoreResult<RgbImage> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| CoreError::image_decode(e.to_string()))?;
        match decoded {
            DynamicImage::ImageRgb8(rgb) => Ok(rgb),
            other => Err(CoreError::unsupported_layout(format!("{:?}", other.color()))),
        }
    }
}

/// Interleaves a planar `RRR..GGG..BBB` buffer into an RGB raster.
///
/// # Errors
///
/// Returns [`CoreError::ImageDecode`] if `planar` does not hold exactly
/// `3 * width * height` bytes.
pub fn planar_to_rgb(planar: &[u8], width: u32, height: u32) -> CoreResult<RgbImage> {
    let plane = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| CoreError::image_decode("raster dimensions overflow"))?;
    let expected = plane
        .checked_mul(3)
        .ok_or_else(|| CoreError::image_decode("raster dimensions overflow"))?;
    if planar.len() != expected {
        return Err(CoreError::image_decode(format!(
            "planar buffer holds {} bytes, expected {expected} for {width}x{height}",
            planar.len()
        )));
    }

    let (red, rest) = planar.split_at(plane);
    let (green, blue) = rest.split_at(plane);
    let mut interleaved = Vec::with_capacity(expected);
    for i in 0..plane {
        interleaved.extend_from_slice(&[red[i], green[i], blue[i]]);
    }

    RgbImage::from_raw(width, height, interleaved)
        .ok_or_else(|| CoreError::image_decode("raster dimensions overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Rgb};
    use std::io::Cursor;

    fn encode(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_rgb_png() {
        let img = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let bytes = encode(DynamicImage::ImageRgb8(img.clone()));

        let decoded = StandardImageDecoder.decode(&bytes).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn rejects_grayscale() {
        let bytes = encode(DynamicImage::ImageLuma8(GrayImage::new(2, 2)));
        let err = StandardImageDecoder.decode(&bytes).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedImageLayout { .. }));
    }

    #[test]
    fn rejects_garbage() {
        let err = StandardImageDecoder.decode(b"not an image").unwrap_err();
        assert!(matches!(err, CoreError::ImageDecode { .. }));
    }

    #[test]
    fn planar_interleave() {
        // 2x1: red plane, green plane, blue plane
        let planar = [1, 2, 3, 4, 5, 6];
        let img = planar_to_rgb(&planar, 2, 1).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgb([1, 3, 5]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([2, 4, 6]));
    }

    #[test]
    fn planar_wrong_size() {
        assert!(planar_to_rgb(&[0; 5], 2, 1).is_err());
    }

    #[test]
    fn planar_huge_dimensions() {
        let err = planar_to_rgb(&[0; 12], u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, CoreError::ImageDecode { .. }));
    }
}
