//! Utility functions for the recognition pipeline.
//!
//! Image loading and grayscale helpers.

pub mod image;

pub use self::image::{
    gray_from_raw, inverted, load_grayscale, load_image, mean_intensity, to_grayscale,
};
