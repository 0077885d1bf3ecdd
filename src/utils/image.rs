//! Utility functions for image loading and conversion.
//!
//! The recognition core accepts any decoded image regardless of where it came
//! from (camera, file, synthetic). The only format-specific work it does is
//! grayscale conversion, done here with ITU-R 601-2 luma weights so that
//! color captures binarize the same way the classifiers' training data did.

use crate::core::errors::{HcrError, HcrResult};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::path::Path;

/// Converts any image to single-channel 8-bit grayscale.
///
/// Images that are already 8-bit grayscale are copied unchanged. Everything
/// else is converted to RGB first (alpha is dropped) and reduced with
/// `L = R * 299/1000 + G * 587/1000 + B * 114/1000`, rounded in fixed point.
///
/// # Arguments
///
/// * `img` - The image to convert
///
/// # Returns
///
/// * `GrayImage` - A new grayscale buffer; the input is never modified
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = img {
        return gray.clone();
    }

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut gray = GrayImage::new(width, height);
    for (dst, src) in gray.pixels_mut().zip(rgb.pixels()) {
        let [r, g, b] = src.0;
        let luma = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        *dst = Luma([luma as u8]);
    }
    gray
}

/// Loads an image from a file path, keeping its color type.
///
/// # Errors
///
/// Returns `HcrError::ImageLoad` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> HcrResult<DynamicImage> {
    image::open(path).map_err(HcrError::ImageLoad)
}

/// Loads an image from a file path and converts it to grayscale.
pub fn load_grayscale(path: &Path) -> HcrResult<GrayImage> {
    load_image(path).map(|img| to_grayscale(&img))
}

/// Creates a grayscale image from row-major samples.
///
/// # Returns
///
/// * `Some(GrayImage)` - The image if the data length matches the dimensions
/// * `None` - If the data length doesn't match the specified dimensions
pub fn gray_from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<GrayImage> {
    if data.len() != (width as usize) * (height as usize) {
        return None;
    }
    ImageBuffer::from_raw(width, height, data)
}

/// Returns the bitwise complement of a grayscale image.
pub fn inverted(img: &GrayImage) -> GrayImage {
    let mut out = img.clone();
    image::imageops::invert(&mut out);
    out
}

/// Mean sample value of a grayscale image (0.0 for an empty image).
pub fn mean_intensity(img: &GrayImage) -> f64 {
    let raw = img.as_raw();
    if raw.is_empty() {
        return 0.0;
    }
    raw.iter().map(|&v| v as u64).sum::<u64>() as f64 / raw.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_grayscale_passthrough_for_luma8() {
        let gray = GrayImage::from_pixel(3, 2, Luma([77]));
        let converted = to_grayscale(&DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(converted, gray);
    }

    #[test]
    fn test_grayscale_uses_601_weights() {
        let mut rgb = RgbImage::new(3, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([0, 255, 0]));
        rgb.put_pixel(2, 0, Rgb([255, 255, 255]));

        let gray = to_grayscale(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_grayscale_drops_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let gray = to_grayscale(&DynamicImage::ImageRgba8(rgba));
        assert!(gray.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_gray_from_raw_checks_length() {
        assert!(gray_from_raw(2, 2, vec![0; 4]).is_some());
        assert!(gray_from_raw(2, 2, vec![0; 5]).is_none());
    }

    #[test]
    fn test_inverted_does_not_touch_input() {
        let img = GrayImage::from_pixel(2, 2, Luma([10]));
        let inv = inverted(&img);
        assert_eq!(inv.get_pixel(0, 0)[0], 245);
        assert_eq!(img.get_pixel(0, 0)[0], 10);
    }

    #[test]
    fn test_mean_intensity() {
        let img = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        assert_eq!(mean_intensity(&img), 127.5);
    }

    #[test]
    fn test_load_image_missing_file() {
        let result = load_image(Path::new("/nonexistent/character.png"));
        assert!(matches!(result, Err(HcrError::ImageLoad(_))));
    }
}
