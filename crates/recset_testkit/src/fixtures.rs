//! On-disk fixtures and image payloads.
//!
//! Provides a temporary working directory and small encoded images for
//! record payloads.

use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory removed on drop.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Creates a fresh temporary directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Root path of the directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        fs::write(&path, contents).expect("Failed to write fixture");
        path
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `f` with a temporary directory that is removed afterwards.
pub fn with_test_dir<F, R>(f: F) -> R
where
    F: FnOnce(&TestDir) -> R,
{
    let dir = TestDir::new();
    f(&dir)
}

/// A deterministic RGB gradient.
pub fn rgb_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
    })
}

/// PNG encoding of [`rgb_image`].
pub fn rgb_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(DynamicImage::ImageRgb8(rgb_image(width, height)))
}

/// PNG encoding of a grayscale image.
pub fn gray_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(DynamicImage::ImageLuma8(GrayImage::new(width, height)))
}

/// PNG encoding of an RGBA image.
pub fn rgba_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(DynamicImage::ImageRgba8(RgbaImage::new(width, height)))
}

/// Splits an RGB image into planar `RRR..GGG..BBB` bytes.
pub fn planar_rgb(img: &RgbImage) -> Vec<u8> {
    let mut planar = Vec::with_capacity(img.as_raw().len());
    for channel in 0..3 {
        planar.extend(img.pixels().map(|p| p.0[channel]));
    }
    planar
}

/// One CIFAR batch record: the label bytes, then `img` as planar pixels.
pub fn cifar_entry(labels: &[u8], img: &RgbImage) -> Vec<u8> {
    let mut entry = labels.to_vec();
    entry.extend(planar_rgb(img));
    entry
}

fn encode_png(img: DynamicImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode PNG fixture");
    out.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents() {
        with_test_dir(|dir| {
            let path = dir.write("vision/cifar10/data.bin", b"abc");
            assert_eq!(fs::read(path).unwrap(), b"abc");
        });
    }

    #[test]
    fn png_fixtures_decode() {
        let img = image::load_from_memory(&rgb_png(4, 3)).unwrap();
        assert_eq!(img.color(), image::ColorType::Rgb8);
        let img = image::load_from_memory(&gray_png(4, 3)).unwrap();
        assert_eq!(img.color(), image::ColorType::L8);
    }

    #[test]
    fn planar_layout() {
        let img = rgb_image(2, 1);
        let planar = planar_rgb(&img);
        assert_eq!(planar.len(), 6);
        assert_eq!(planar[0], img.get_pixel(0, 0).0[0]);
        assert_eq!(planar[2], img.get_pixel(0, 0).0[1]);
        assert_eq!(planar[5], img.get_pixel(1, 0).0[2]);
    }

    #[test]
    fn cifar_entry_layout() {
        let entry = cifar_entry(&[2, 17], &rgb_image(32, 32));
        assert_eq!(entry.len(), 2 + 3072);
        assert_eq!(&entry[..2], &[2, 17]);
    }
}
