//! Mode-specific behaviour of the recognition pipeline.
//!
//! Preprocessing and label decoding both branch on the mode. Implementations
//! of [`Pipeline`] bundle the two branches so the mode is checked once per
//! request, when the pipeline is selected.

use crate::core::errors::HcrResult;
use crate::domain::{CharacterLabel, Mode};
use crate::processors::{PolarityPolicy, PreprocessedTensor, PreprocessingTrace, Preprocessor};
use image::DynamicImage;
use std::fmt::Debug;

/// Preprocess-and-decode capability of one recognition mode.
pub trait Pipeline: Send + Sync + Debug {
    /// The mode this pipeline implements.
    fn mode(&self) -> Mode;

    /// When the polarity step inverts the thresholded image.
    fn polarity(&self) -> PolarityPolicy;

    /// Maps an arg-max class index to a label for a classifier with `arity` outputs.
    fn decode_label(&self, class_index: usize, arity: usize) -> CharacterLabel;

    /// Converts an image into a model-ready tensor and its stage trace.
    fn preprocess(
        &self,
        image: &DynamicImage,
    ) -> HcrResult<(PreprocessedTensor, PreprocessingTrace)> {
        Preprocessor::new(self.polarity()).run(image)
    }
}
