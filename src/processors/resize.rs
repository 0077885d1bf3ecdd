//! Area-averaging resize.
//!
//! Every destination pixel is the coverage-weighted mean of the source
//! pixels its footprint overlaps. When shrinking large handwriting strokes
//! onto the 28x28 grid this keeps thin strokes as gray levels instead of
//! dropping them, which nearest-neighbour and bilinear sampling do.

use crate::core::errors::{HcrError, HcrResult, ProcessingStage};
use image::{GrayImage, Luma};

/// Resizes a grayscale image with area averaging.
///
/// # Errors
///
/// Returns a resize error if either the source or the target has a zero
/// dimension.
pub fn resize_area(img: &GrayImage, width: u32, height: u32) -> HcrResult<GrayImage> {
    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return Err(HcrError::processing_message(
            ProcessingStage::Resize,
            format!("cannot resize {src_w}x{src_h} image to {width}x{height}"),
        ));
    }

    if (src_w, src_h) == (width, height) {
        return Ok(img.clone());
    }

    let x_weights = axis_weights(src_w, width);
    let y_weights = axis_weights(src_h, height);

    let mut out = GrayImage::new(width, height);
    for (dy, row_weights) in y_weights.iter().enumerate() {
        for (dx, col_weights) in x_weights.iter().enumerate() {
            let mut acc = 0.0f64;
            for &(sy, wy) in row_weights {
                for &(sx, wx) in col_weights {
                    acc += wy * wx * img.get_pixel(sx, sy)[0] as f64;
                }
            }
            let value = acc.round().clamp(0.0, 255.0) as u8;
            out.put_pixel(dx as u32, dy as u32, Luma([value]));
        }
    }
    Ok(out)
}

/// For each destination index, the overlapped source indices and their
/// normalized coverage weights.
fn axis_weights(src: u32, dst: u32) -> Vec<Vec<(u32, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|d| {
            let start = d as f64 * scale;
            let end = ((d + 1) as f64 * scale).min(src as f64);
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src);
            let mut weights: Vec<(u32, f64)> = (first..last)
                .filter_map(|s| {
                    let overlap = end.min(s as f64 + 1.0) - start.max(s as f64);
                    (overlap > 1e-9).then_some((s, overlap))
                })
                .collect();
            let total: f64 = weights.iter().map(|(_, w)| w).sum();
            for (_, w) in &mut weights {
                *w /= total;
            }
            weights
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_size_is_identity() {
        let img = GrayImage::from_fn(28, 28, |x, y| Luma([((x * 9 + y) % 256) as u8]));
        let out = resize_area(&img, 28, 28).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_integer_downscale_averages_blocks() {
        // 4x4 -> 2x2: each output is the mean of a 2x2 block.
        let img = GrayImage::from_raw(
            4,
            4,
            vec![
                0, 255, 10, 10, //
                255, 0, 10, 10, //
                0, 0, 200, 100, //
                0, 0, 100, 200,
            ],
        )
        .unwrap();
        let out = resize_area(&img, 2, 2).unwrap();
        assert_eq!(out.get_pixel(0, 0)[0], 128); // 127.5 rounds up
        assert_eq!(out.get_pixel(1, 0)[0], 10);
        assert_eq!(out.get_pixel(0, 1)[0], 0);
        assert_eq!(out.get_pixel(1, 1)[0], 150);
    }

    #[test]
    fn test_fractional_downscale_preserves_uniform_value() {
        let img = GrayImage::from_pixel(100, 37, Luma([200]));
        let out = resize_area(&img, 28, 28).unwrap();
        assert_eq!(out.dimensions(), (28, 28));
        assert!(out.pixels().all(|p| p[0] == 200));
    }

    #[test]
    fn test_upscale_of_single_pixel() {
        let img = GrayImage::from_pixel(1, 1, Luma([255]));
        let out = resize_area(&img, 28, 28).unwrap();
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_thin_stroke_survives_as_gray() {
        // one bright column in 56 columns becomes a half-intensity column
        let img = GrayImage::from_fn(56, 56, |x, _| Luma([if x == 20 { 255 } else { 0 }]));
        let out = resize_area(&img, 28, 28).unwrap();
        assert_eq!(out.get_pixel(10, 5)[0], 128);
    }

    #[test]
    fn test_zero_target_rejected() {
        let img = GrayImage::new(4, 4);
        assert!(resize_area(&img, 0, 28).is_err());
    }

    #[test]
    fn test_weights_sum_to_one() {
        for (src, dst) in [(100, 28), (28, 100), (29, 28), (3, 7)] {
            for w in axis_weights(src, dst) {
                let total: f64 = w.iter().map(|(_, w)| w).sum();
                assert!((total - 1.0).abs() < 1e-9);
            }
        }
    }
}
