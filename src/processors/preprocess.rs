//! MNIST-style preprocessing: grayscale, binarize, fix polarity, resize, scale.
//!
//! Both classifiers were trained on light strokes over a dark background at
//! 28x28. Captured handwriting is usually the opposite, so the digit
//! pipeline always inverts after thresholding. Alphabet inputs may arrive in
//! either polarity (dataset samples are already light-on-dark), so the
//! alphabet pipeline only inverts when the thresholded image is mostly
//! bright.
//!
//! Every stage result is copied into a [`PreprocessingTrace`] for
//! diagnostics.

use crate::core::constants::{BINARY_THRESHOLD, MODEL_INPUT_SIZE, POLARITY_MEAN_THRESHOLD};
use crate::core::errors::{HcrError, HcrResult};
use crate::domain::Mode;
use crate::processors::resize::resize_area;
use crate::utils::{inverted, mean_intensity, to_grayscale};
use image::{DynamicImage, GrayImage, Luma};
use ndarray::{Array2, Array4, ArrayView2};
use std::fmt;
use tracing::debug;

/// A 28x28 tensor of values in `[0, 1]`, ready for classifier invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedTensor {
    data: Array2<f32>,
}

impl PreprocessedTensor {
    /// Wraps a 28x28 array, checking shape and value range.
    ///
    /// # Errors
    ///
    /// Returns `HcrError::InvalidInput` if the array is not 28x28 or holds a
    /// value outside `[0, 1]` (including NaN).
    pub fn new(data: Array2<f32>) -> HcrResult<Self> {
        let side = MODEL_INPUT_SIZE as usize;
        if data.dim() != (side, side) {
            return Err(HcrError::invalid_input(format!(
                "expected a {side}x{side} tensor, got {:?}",
                data.dim()
            )));
        }
        if let Some(bad) = data.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(HcrError::invalid_input(format!(
                "tensor value {bad} is outside [0, 1]"
            )));
        }
        Ok(Self { data })
    }

    /// Scales a 28x28 grayscale image into `[0, 1]`.
    pub fn from_gray(image: &GrayImage) -> HcrResult<Self> {
        Self::new(scale_to_unit(image)?)
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    pub fn into_inner(self) -> Array2<f32> {
        self.data
    }

    /// Number of values (always 784).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Largest value in the tensor.
    pub fn max_value(&self) -> f32 {
        self.data.iter().copied().fold(0.0, f32::max)
    }

    /// Expands to the `(1, 28, 28, 1)` batch layout.
    pub fn to_batch(&self) -> Array4<f32> {
        let side = MODEL_INPUT_SIZE as usize;
        let mut batch = Array4::<f32>::zeros((1, side, side, 1));
        for ((y, x), &v) in self.data.indexed_iter() {
            batch[[0, y, x, 0]] = v;
        }
        batch
    }
}

/// Named stages recorded in a [`PreprocessingTrace`], in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceStage {
    Original,
    Thresholded,
    Inverted,
    Resized,
    Normalized,
}

impl TraceStage {
    pub const ALL: [TraceStage; 5] = [
        TraceStage::Original,
        TraceStage::Thresholded,
        TraceStage::Inverted,
        TraceStage::Resized,
        TraceStage::Normalized,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TraceStage::Original => "original",
            TraceStage::Thresholded => "thresholded",
            TraceStage::Inverted => "inverted",
            TraceStage::Resized => "resized",
            TraceStage::Normalized => "normalized",
        }
    }
}

impl fmt::Display for TraceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of one stage's output.
#[derive(Debug, Clone, PartialEq)]
pub enum StageBuffer {
    /// The caller's image as received (any color type).
    Image(DynamicImage),
    Gray(GrayImage),
    Float(Array2<f32>),
}

impl StageBuffer {
    /// Width and height of the buffer.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            StageBuffer::Image(img) => (img.width(), img.height()),
            StageBuffer::Gray(img) => img.dimensions(),
            StageBuffer::Float(arr) => (arr.ncols() as u32, arr.nrows() as u32),
        }
    }

    /// Mean value on the 0-255 scale for integer buffers, 0-1 for floats.
    pub fn mean(&self) -> f64 {
        match self {
            StageBuffer::Image(img) => mean_intensity(&to_grayscale(img)),
            StageBuffer::Gray(img) => mean_intensity(img),
            StageBuffer::Float(arr) => arr.mean().map(f64::from).unwrap_or(0.0),
        }
    }
}

/// Ordered stage-name to buffer record of one preprocessing run.
///
/// Entries are owned copies; later stages never alias earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreprocessingTrace {
    stages: Vec<(TraceStage, StageBuffer)>,
    polarity_inverted: bool,
}

impl PreprocessingTrace {
    fn record(&mut self, stage: TraceStage, buffer: StageBuffer) {
        self.stages.push((stage, buffer));
    }

    pub fn get(&self, stage: TraceStage) -> Option<&StageBuffer> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, b)| b)
    }

    /// Looks a stage up by its key (`"original"`, `"thresholded"`, ...).
    pub fn get_by_name(&self, name: &str) -> Option<&StageBuffer> {
        self.stages
            .iter()
            .find(|(s, _)| s.as_str() == name)
            .map(|(_, b)| b)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(TraceStage, StageBuffer)> {
        self.stages.iter()
    }

    /// Stage keys in recording order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(s, _)| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Whether the polarity step actually complemented the image.
    pub fn polarity_inverted(&self) -> bool {
        self.polarity_inverted
    }
}

/// When the polarity step inverts the thresholded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarityPolicy {
    /// Always invert (dark ink on light paper is assumed).
    Always,
    /// Invert only if the thresholded mean exceeds 127.
    WhenLightBackground,
}

impl PolarityPolicy {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Digit => PolarityPolicy::Always,
            Mode::Alphabet => PolarityPolicy::WhenLightBackground,
        }
    }

    fn should_invert(self, binary: &GrayImage) -> bool {
        match self {
            PolarityPolicy::Always => true,
            PolarityPolicy::WhenLightBackground => mean_intensity(binary) > POLARITY_MEAN_THRESHOLD,
        }
    }
}

/// Converts arbitrary images into [`PreprocessedTensor`]s.
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    polarity: PolarityPolicy,
}

impl Preprocessor {
    pub fn new(polarity: PolarityPolicy) -> Self {
        Self { polarity }
    }

    pub fn for_mode(mode: Mode) -> Self {
        Self::new(PolarityPolicy::for_mode(mode))
    }

    pub fn polarity(&self) -> PolarityPolicy {
        self.polarity
    }

    /// Runs the five preprocessing steps and records each stage.
    ///
    /// # Errors
    ///
    /// Fails only for images with a zero dimension.
    pub fn run(&self, image: &DynamicImage) -> HcrResult<(PreprocessedTensor, PreprocessingTrace)> {
        if image.width() == 0 || image.height() == 0 {
            return Err(HcrError::invalid_input("image has a zero dimension"));
        }

        let mut trace = PreprocessingTrace::default();
        trace.record(TraceStage::Original, StageBuffer::Image(image.clone()));

        let gray = to_grayscale(image);
        let binary = threshold(&gray, BINARY_THRESHOLD);
        trace.record(TraceStage::Thresholded, StageBuffer::Gray(binary.clone()));

        let invert = self.polarity.should_invert(&binary);
        let polarized = if invert { inverted(&binary) } else { binary };
        trace.polarity_inverted = invert;
        trace.record(TraceStage::Inverted, StageBuffer::Gray(polarized.clone()));

        let resized = resize_area(&polarized, MODEL_INPUT_SIZE, MODEL_INPUT_SIZE)?;
        trace.record(TraceStage::Resized, StageBuffer::Gray(resized.clone()));

        let normalized = scale_to_unit(&resized)?;
        trace.record(TraceStage::Normalized, StageBuffer::Float(normalized.clone()));

        debug!(
            "Preprocessed {}x{} image ({:?}, inverted={})",
            image.width(),
            image.height(),
            self.polarity,
            invert
        );

        Ok((PreprocessedTensor::new(normalized)?, trace))
    }
}

/// Preprocesses an image for the given mode.
pub fn preprocess(
    image: &DynamicImage,
    mode: Mode,
) -> HcrResult<(PreprocessedTensor, PreprocessingTrace)> {
    Preprocessor::for_mode(mode).run(image)
}

/// Global binarization: `>= threshold` becomes 255, everything else 0.
pub fn threshold(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = image.clone();
    for p in out.pixels_mut() {
        *p = Luma([if p[0] >= threshold { 255 } else { 0 }]);
    }
    out
}

fn scale_to_unit(image: &GrayImage) -> HcrResult<Array2<f32>> {
    let (width, height) = image.dimensions();
    let values: Vec<f32> = image.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
    Array2::from_shape_vec((height as usize, width as usize), values)
        .map_err(|e| HcrError::tensor_operation("scaling image to unit range", e))
}
