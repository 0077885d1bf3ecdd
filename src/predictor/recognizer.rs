//! End-to-end recognition: assess, preprocess, predict.
//!
//! A [`Recognizer`] owns the model registry and configuration. Each request
//! runs synchronously to completion; batches only fan independent requests
//! out over rayon.

use super::decoder::PredictionDecoder;
use super::pipeline::pipeline_for;
use super::registry::ModelRegistry;
use crate::core::config::{ConfigValidator, RecognizerConfig};
use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;
use crate::core::errors::HcrResult;
use crate::core::traits::Classifier;
use crate::domain::{Mode, PredictionOutcome};
use crate::processors::{PreprocessedTensor, PreprocessingTrace, QualityAssessor, QualityReport};
use crate::samples::LabeledSample;
use crate::utils::to_grayscale;
use image::DynamicImage;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything produced for one image.
#[derive(Debug, Clone)]
pub struct Recognition {
    pub mode: Mode,
    pub quality: QualityReport,
    pub tensor: PreprocessedTensor,
    pub trace: PreprocessingTrace,
    pub outcome: PredictionOutcome,
}

impl Recognition {
    pub fn label(&self) -> Option<String> {
        self.outcome.label()
    }

    pub fn confidence(&self) -> f32 {
        self.outcome.confidence()
    }
}

/// Result of running one labeled sample.
#[derive(Debug, Clone, Serialize)]
pub struct SampleEvaluation {
    pub expected: char,
    pub predicted: Option<String>,
    pub confidence: f32,
    /// `None` when no prediction was made.
    pub correct: Option<bool>,
    pub quality_score: u8,
}

/// Per-sample results of [`Recognizer::evaluate_samples`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    pub results: Vec<SampleEvaluation>,
}

impl EvaluationReport {
    /// Samples that produced a prediction.
    pub fn predicted_count(&self) -> usize {
        self.results.iter().filter(|r| r.correct.is_some()).count()
    }

    pub fn correct_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.correct == Some(true))
            .count()
    }

    /// Fraction of predicted samples that were correct.
    pub fn accuracy(&self) -> Option<f64> {
        match self.predicted_count() {
            0 => None,
            n => Some(self.correct_count() as f64 / n as f64),
        }
    }
}

/// Quality assessment, preprocessing and prediction for both modes.
#[derive(Debug, Clone)]
pub struct Recognizer {
    registry: ModelRegistry,
    config: RecognizerConfig,
    assessor: QualityAssessor,
    decoder: PredictionDecoder,
}

impl Recognizer {
    /// Creates a recognizer, validating the configuration.
    pub fn new(registry: ModelRegistry, config: RecognizerConfig) -> HcrResult<Self> {
        config.validate()?;
        Ok(Self {
            assessor: QualityAssessor::new(config.quality.clone()),
            decoder: PredictionDecoder::new(&config.decoder),
            registry,
            config,
        })
    }

    pub fn builder() -> RecognizerBuilder {
        RecognizerBuilder::new()
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Runs one image through the pipeline for `mode`.
    ///
    /// A missing or failing classifier is reported in
    /// [`Recognition::outcome`], not as an error.
    ///
    /// # Errors
    ///
    /// Fails only if the image cannot be preprocessed (zero-sized input).
    pub fn recognize(&self, image: &DynamicImage, mode: Mode) -> HcrResult<Recognition> {
        let pipeline = pipeline_for(mode);
        let quality = self.assessor.assess(&to_grayscale(image), mode);
        let (tensor, trace) = pipeline.preprocess(image)?;
        let outcome = self
            .decoder
            .predict(&tensor, self.registry.classifier(mode), pipeline);

        debug!(
            "Recognized {} input: quality={} outcome={:?}",
            mode,
            quality.score,
            outcome.label()
        );
        Ok(Recognition {
            mode,
            quality,
            tensor,
            trace,
            outcome,
        })
    }

    /// Runs many images, in parallel above the batch threshold.
    ///
    /// Results keep input order; each image succeeds or fails on its own.
    pub fn recognize_batch(
        &self,
        images: &[DynamicImage],
        mode: Mode,
    ) -> Vec<HcrResult<Recognition>> {
        if images.len() > DEFAULT_PARALLEL_THRESHOLD {
            debug!("Using parallel processing for {} images", images.len());
            images
                .par_iter()
                .map(|image| self.recognize(image, mode))
                .collect()
        } else {
            debug!("Using sequential processing for {} images", images.len());
            images
                .iter()
                .map(|image| self.recognize(image, mode))
                .collect()
        }
    }

    /// Runs labeled samples and checks each prediction against its label.
    pub fn evaluate_samples(
        &self,
        samples: &[LabeledSample],
        mode: Mode,
    ) -> HcrResult<EvaluationReport> {
        let mut report = EvaluationReport::default();
        for sample in samples {
            let image = DynamicImage::ImageLuma8(sample.image.clone());
            let recognition = self.recognize(&image, mode)?;
            let expected = sample.label.to_string();
            let prediction = recognition.outcome.prediction();
            report.results.push(SampleEvaluation {
                expected: sample.label,
                predicted: recognition.label(),
                confidence: recognition.confidence(),
                correct: prediction.map(|p| p.matches(&expected)),
                quality_score: recognition.quality.score,
            });
        }

        if let Some(accuracy) = report.accuracy() {
            info!(
                "Evaluated {} {} samples: {}/{} correct ({:.1}%)",
                samples.len(),
                mode,
                report.correct_count(),
                report.predicted_count(),
                accuracy * 100.0
            );
        }
        Ok(report)
    }
}

/// Builder for [`Recognizer`].
#[derive(Debug, Default)]
pub struct RecognizerBuilder {
    registry: ModelRegistry,
    config: RecognizerConfig,
}

impl RecognizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a classifier for a mode.
    pub fn classifier(mut self, mode: Mode, classifier: Arc<dyn Classifier>) -> Self {
        self.registry = self.registry.with_classifier(mode, classifier);
        self
    }

    pub fn registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(mut self, config: RecognizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how many ranked classes each prediction keeps.
    pub fn topk(mut self, topk: usize) -> Self {
        self.config.decoder.topk = topk;
        self
    }

    /// Builds the recognizer.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration is invalid.
    pub fn build(self) -> HcrResult<Recognizer> {
        Recognizer::new(self.registry, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::HcrError;
    use crate::core::traits::ModelShape;
    use image::{GrayImage, Luma};
    use ndarray::{Array2, ArrayView4};

    /// Returns the same probability row for every input.
    #[derive(Debug)]
    struct FixedRow(Vec<f32>);

    impl Classifier for FixedRow {
        fn name(&self) -> &str {
            "fixed"
        }

        fn input_shape(&self) -> ModelShape {
            ModelShape::image_batch(28, 28, 1)
        }

        fn output_shape(&self) -> ModelShape {
            ModelShape::class_scores(self.0.len())
        }

        fn invoke(&self, batch: ArrayView4<'_, f32>) -> HcrResult<Array2<f32>> {
            let n = batch.shape()[0];
            let data = self
                .0
                .iter()
                .copied()
                .cycle()
                .take(n * self.0.len())
                .collect();
            Ok(Array2::from_shape_vec((n, self.0.len()), data)?)
        }
    }

    /// Predicts class 0 for dark tensors and class 1 otherwise.
    #[derive(Debug)]
    struct InkDetector;

    impl Classifier for InkDetector {
        fn name(&self) -> &str {
            "ink"
        }

        fn input_shape(&self) -> ModelShape {
            ModelShape::image_batch(28, 28, 1)
        }

        fn output_shape(&self) -> ModelShape {
            ModelShape::class_scores(26)
        }

        fn invoke(&self, batch: ArrayView4<'_, f32>) -> HcrResult<Array2<f32>> {
            let inked = batch.iter().any(|&v| v > 0.5);
            let mut row = vec![0.0f32; 26];
            row[usize::from(inked)] = 1.0;
            Array2::from_shape_vec((1, 26), row)
                .map_err(|e| HcrError::inference("ink", "building output", e))
        }
    }

    fn white(side: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(side, side, Luma([255])))
    }

    #[test]
    fn test_white_digit_with_stub_is_zero() {
        let mut row = vec![0.02f32; 10];
        row[0] = 0.9;
        let recognizer = Recognizer::builder()
            .classifier(Mode::Digit, Arc::new(FixedRow(row)))
            .build()
            .unwrap();

        let recognition = recognizer.recognize(&white(28), Mode::Digit).unwrap();
        assert_eq!(recognition.label().as_deref(), Some("0"));
        assert!((recognition.confidence() - 0.9).abs() < 1e-6);
        assert_eq!(recognition.trace.len(), 5);
        assert!(recognition.tensor.view().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_missing_model_still_reports_quality() {
        let recognizer = Recognizer::builder().build().unwrap();
        let recognition = recognizer.recognize(&white(28), Mode::Alphabet).unwrap();

        assert!(recognition.outcome.is_unavailable());
        assert_eq!(recognition.confidence(), 0.0);
        assert!(recognition.quality.score <= 75);
    }

    #[test]
    fn test_batch_keeps_order_on_both_paths() {
        let recognizer = Recognizer::builder()
            .classifier(Mode::Alphabet, Arc::new(InkDetector))
            .build()
            .unwrap();
        let black = DynamicImage::ImageLuma8(GrayImage::new(40, 40));
        let stroke = DynamicImage::ImageLuma8(GrayImage::from_fn(40, 40, |x, _| {
            Luma([if (18..22).contains(&x) { 255 } else { 0 }])
        }));
        let pair = [black, stroke];

        for count in [2usize, 9] {
            let images: Vec<DynamicImage> = (0..count).map(|i| pair[i % 2].clone()).collect();
            let results = recognizer.recognize_batch(&images, Mode::Alphabet);
            assert_eq!(results.len(), count);
            for (i, result) in results.iter().enumerate() {
                let expected = if i % 2 == 0 { "A" } else { "B" };
                assert_eq!(result.as_ref().unwrap().label().as_deref(), Some(expected));
            }
        }
    }

    #[test]
    fn test_evaluate_samples_counts_matches() {
        let recognizer = Recognizer::builder()
            .classifier(Mode::Alphabet, Arc::new(InkDetector))
            .build()
            .unwrap();
        let samples = vec![
            LabeledSample::new('A', GrayImage::new(28, 28)),
            LabeledSample::new('b', GrayImage::from_pixel(28, 28, Luma([0]))),
        ];

        let report = recognizer
            .evaluate_samples(&samples, Mode::Alphabet)
            .unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].correct, Some(true));
        assert_eq!(report.results[1].correct, Some(false));
        assert_eq!(report.accuracy(), Some(0.5));
    }

    #[test]
    fn test_evaluate_without_model_has_no_accuracy() {
        let recognizer = Recognizer::builder().build().unwrap();
        let samples = vec![LabeledSample::new('A', GrayImage::new(28, 28))];
        let report = recognizer
            .evaluate_samples(&samples, Mode::Alphabet)
            .unwrap();
        assert_eq!(report.results[0].correct, None);
        assert_eq!(report.accuracy(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Recognizer::builder().topk(0).build().is_err());
    }
}
