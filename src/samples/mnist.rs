//! MNIST digit samples.
//!
//! Files are read with [`mnist::MnistBuilder`] from a directory holding the
//! four canonical IDX files. The builder panics on missing or malformed
//! files, so existence is checked first and any remaining failure is
//! reported as a dataset error.

use super::{LabeledSample, SampleSet, SampleTierKind};
use crate::core::constants::MODEL_INPUT_SIZE;
use crate::core::errors::{HcrError, HcrResult};
use crate::utils::inverted;
use image::GrayImage;
use mnist::MnistBuilder;
use rand::RngCore;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{info, warn};

pub const TRAINING_IMAGES_FILE: &str = "train-images-idx3-ubyte";
pub const TRAINING_LABELS_FILE: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES_FILE: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS_FILE: &str = "t10k-labels-idx1-ubyte";

const TRAINING_SET_LENGTH: u32 = 60_000;
const TEST_SET_LENGTH: u32 = 10_000;
const IMAGE_LEN: usize = (MODEL_INPUT_SIZE * MODEL_INPUT_SIZE) as usize;

/// An in-memory MNIST split.
#[derive(Debug, Clone)]
pub struct MnistSamples {
    pixels: Vec<u8>,
    labels: Vec<u8>,
}

impl MnistSamples {
    /// Loads the 10k test split from an MNIST directory.
    ///
    /// All four canonical files must be present.
    ///
    /// # Errors
    ///
    /// Returns `HcrError::Dataset` if a file is missing or cannot be parsed,
    /// or the decoded split fails [`MnistSamples::from_parts`].
    pub fn load(dir: &Path) -> HcrResult<Self> {
        for file in [
            TRAINING_IMAGES_FILE,
            TRAINING_LABELS_FILE,
            TEST_IMAGES_FILE,
            TEST_LABELS_FILE,
        ] {
            let path = dir.join(file);
            if !path.is_file() {
                return Err(HcrError::dataset(&path, "missing MNIST file"));
            }
        }
        let base_path = dir
            .to_str()
            .ok_or_else(|| HcrError::dataset(dir, "path is not valid UTF-8"))?;

        let mut builder = MnistBuilder::new();
        builder
            .base_path(base_path)
            .training_images_filename(TRAINING_IMAGES_FILE)
            .training_labels_filename(TRAINING_LABELS_FILE)
            .test_images_filename(TEST_IMAGES_FILE)
            .test_labels_filename(TEST_LABELS_FILE)
            .label_format_digit()
            .training_set_length(TRAINING_SET_LENGTH)
            .validation_set_length(0)
            .test_set_length(TEST_SET_LENGTH);
        let finalized = panic::catch_unwind(AssertUnwindSafe(|| builder.finalize()));
        let mnist = finalized.map_err(|cause| {
            let detail = cause
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| cause.downcast_ref::<&str>().copied())
                .unwrap_or("unreadable IDX data");
            warn!("MNIST reader rejected {}: {}", dir.display(), detail);
            HcrError::dataset(dir, format!("malformed MNIST files: {detail}"))
        })?;

        let samples = Self::from_parts(mnist.tst_img, mnist.tst_lbl)
            .map_err(|e| HcrError::dataset(dir, e.to_string()))?;
        info!("Loaded {} MNIST samples from {}", samples.len(), dir.display());
        Ok(samples)
    }

    /// Wraps raw 28x28 pixel rows and digit labels.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if the pixel count does not match the
    /// label count or a label is not a digit.
    pub fn from_parts(pixels: Vec<u8>, labels: Vec<u8>) -> HcrResult<Self> {
        if pixels.len() != labels.len() * IMAGE_LEN {
            return Err(HcrError::invalid_input(format!(
                "{} pixels for {} labels of 28x28 images",
                pixels.len(),
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|&&l| l > 9) {
            return Err(HcrError::invalid_input(format!("invalid digit label {bad}")));
        }
        Ok(Self { pixels, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The raw (light-on-dark) image and label at `index`.
    pub fn get(&self, index: usize) -> Option<(u8, GrayImage)> {
        let label = *self.labels.get(index)?;
        let start = index * IMAGE_LEN;
        let data = self.pixels.get(start..start + IMAGE_LEN)?.to_vec();
        let image = GrayImage::from_raw(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, data)?;
        Some((label, image))
    }

    /// Draws up to `n` distinct random samples, inverted to dark ink on
    /// light paper like a photographed digit.
    pub fn sample(&self, n: usize, rng: &mut dyn RngCore) -> SampleSet {
        let amount = n.min(self.len());
        let samples = rand::seq::index::sample(rng, self.len(), amount)
            .into_iter()
            .filter_map(|i| self.get(i))
            .map(|(label, image)| LabeledSample::new((b'0' + label) as char, inverted(&image)))
            .collect();
        SampleSet::new(SampleTierKind::Mnist, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    fn filled(labels: &[u8], fill: impl Fn(usize) -> u8) -> MnistSamples {
        let pixels = (0..labels.len())
            .flat_map(|i| std::iter::repeat_n(fill(i), IMAGE_LEN))
            .collect();
        MnistSamples::from_parts(pixels, labels.to_vec()).unwrap()
    }

    #[test]
    fn test_from_parts_and_get() {
        let mnist = filled(&[7, 1, 4], |i| (i * 100) as u8);

        assert_eq!(mnist.len(), 3);
        let (label, image) = mnist.get(2).unwrap();
        assert_eq!(label, 4);
        assert_eq!(image.dimensions(), (28, 28));
        assert_eq!(image.get_pixel(0, 0)[0], 200);
        assert!(mnist.get(3).is_none());
    }

    #[test]
    fn test_sample_inverts_and_labels() {
        let mnist = filled(&[0, 1, 2, 3, 4], |_| 0);
        let mut rng = StdRng::seed_from_u64(2);

        let set = mnist.sample(10, &mut rng);
        assert_eq!(set.len(), 5);
        assert_eq!(set.tier(), SampleTierKind::Mnist);
        let mut labels = set.labels();
        labels.sort();
        assert_eq!(labels, vec!['0', '1', '2', '3', '4']);
        assert!(set.samples()[0].image.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_non_digit_label_rejected() {
        let result = MnistSamples::from_parts(vec![0; IMAGE_LEN], vec![10]);
        assert!(result.unwrap_err().to_string().contains("label 10"));
    }

    #[test]
    fn test_pixel_count_mismatch_rejected() {
        let result = MnistSamples::from_parts(vec![0; IMAGE_LEN + 1], vec![1]);
        assert!(matches!(result, Err(HcrError::InvalidInput { .. })));
    }

    #[test]
    fn test_missing_file_is_dataset_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TRAINING_IMAGES_FILE), [0u8; 16]).unwrap();

        let err = MnistSamples::load(dir.path()).unwrap_err();
        assert!(matches!(err, HcrError::Dataset { .. }));
        assert!(err.to_string().contains(TRAINING_LABELS_FILE));
    }

    #[test]
    fn test_malformed_files_are_dataset_error() {
        let dir = TempDir::new().unwrap();
        for file in [
            TRAINING_IMAGES_FILE,
            TRAINING_LABELS_FILE,
            TEST_IMAGES_FILE,
            TEST_LABELS_FILE,
        ] {
            std::fs::write(dir.path().join(file), b"not an idx file").unwrap();
        }

        let err = MnistSamples::load(dir.path()).unwrap_err();
        assert!(matches!(err, HcrError::Dataset { .. }));
        assert!(err.to_string().contains("malformed"));
    }
}
