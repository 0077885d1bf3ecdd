//! Classifier invocation and output decoding.
//!
//! The decoder is the boundary where classifier problems stop: a missing
//! classifier yields [`PredictionOutcome::Unavailable`] without invoking
//! anything, and any invocation error or unusable output yields
//! [`PredictionOutcome::Failed`]. Neither case is returned as an `Err`.

use crate::core::config::DecoderConfig;
use crate::core::constants::{MODEL_INPUT_LEN, MODEL_INPUT_SIZE};
use crate::core::traits::{Classifier, Pipeline};
use crate::domain::{Prediction, PredictionOutcome, RankedClass};
use crate::processors::{PreprocessedTensor, Topk};
use ndarray::{Array4, ArrayView2};
use tracing::{debug, warn};

/// Invokes a classifier on one tensor and decodes its probability row.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionDecoder {
    topk: Topk,
}

impl PredictionDecoder {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            topk: Topk::new(config.topk),
        }
    }

    /// Predicts the label of a preprocessed tensor.
    pub fn predict(
        &self,
        tensor: &PreprocessedTensor,
        classifier: Option<&dyn Classifier>,
        pipeline: &dyn Pipeline,
    ) -> PredictionOutcome {
        self.predict_array(tensor.view(), classifier, pipeline)
    }

    /// Predicts from a raw 2-D array.
    ///
    /// The array is reshaped to `(1, 28, 28, 1)`; an array that does not hold
    /// exactly 784 values is reported as a failed prediction. Values on the
    /// 0-255 scale (any value above 1.0) are rescaled by 1/255 first.
    pub fn predict_array(
        &self,
        values: ArrayView2<'_, f32>,
        classifier: Option<&dyn Classifier>,
        pipeline: &dyn Pipeline,
    ) -> PredictionOutcome {
        let Some(classifier) = classifier else {
            debug!("No {} classifier available, skipping prediction", pipeline.mode());
            return PredictionOutcome::Unavailable;
        };

        let batch = match to_model_batch(values) {
            Ok(batch) => batch,
            Err(reason) => {
                warn!("Prediction input rejected for '{}': {}", classifier.name(), reason);
                return PredictionOutcome::Failed { reason };
            }
        };

        let output = match classifier.invoke(batch.view()) {
            Ok(output) => output,
            Err(e) => {
                warn!("Classifier '{}' failed: {}", classifier.name(), e);
                return PredictionOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let Some(row) = output.rows().into_iter().next() else {
            warn!("Classifier '{}' returned no rows", classifier.name());
            return PredictionOutcome::Failed {
                reason: "classifier returned an empty batch".to_string(),
            };
        };
        let row: Vec<f32> = row.iter().copied().collect();

        match self.decode_row(&row, pipeline) {
            Ok(prediction) => {
                debug!(
                    "'{}' predicted {} ({:.3}) from {} classes",
                    classifier.name(),
                    prediction.label,
                    prediction.confidence,
                    prediction.arity
                );
                PredictionOutcome::Predicted(prediction)
            }
            Err(reason) => {
                warn!("Classifier '{}' output unusable: {}", classifier.name(), reason);
                PredictionOutcome::Failed { reason }
            }
        }
    }

    /// Decodes one probability row with the pipeline's label mapping.
    pub fn decode_row(&self, row: &[f32], pipeline: &dyn Pipeline) -> Result<Prediction, String> {
        if row.is_empty() {
            return Err("classifier returned an empty probability vector".to_string());
        }
        if let Some(i) = row.iter().position(|v| !v.is_finite()) {
            return Err(format!("non-finite score {} at class {}", row[i], i));
        }

        let (class_index, confidence) = argmax(row);
        let arity = row.len();
        let top_k = self
            .topk
            .process_row(row)
            .iter()
            .map(|(index, score)| RankedClass {
                class_index: index,
                label: pipeline.decode_label(index, arity),
                score,
            })
            .collect();

        Ok(Prediction {
            label: pipeline.decode_label(class_index, arity),
            confidence: confidence.clamp(0.0, 1.0),
            class_index,
            arity,
            top_k,
        })
    }
}

/// Index and value of the maximum; the lowest index wins ties.
fn argmax(row: &[f32]) -> (usize, f32) {
    let mut best = (0, row[0]);
    for (i, &v) in row.iter().enumerate().skip(1) {
        if v > best.1 {
            best = (i, v);
        }
    }
    best
}

fn to_model_batch(values: ArrayView2<'_, f32>) -> Result<Array4<f32>, String> {
    if values.len() != MODEL_INPUT_LEN {
        return Err(format!(
            "cannot reshape {} values into (1, {MODEL_INPUT_SIZE}, {MODEL_INPUT_SIZE}, 1)",
            values.len()
        ));
    }
    let rescale = values.iter().any(|&v| v > 1.0);
    let side = MODEL_INPUT_SIZE as usize;
    let flat: Vec<f32> = values
        .iter()
        .map(|&v| if rescale { v / 255.0 } else { v })
        .collect();
    Array4::from_shape_vec((1, side, side, 1), flat).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{HcrError, HcrResult};
    use crate::core::traits::ModelShape;
    use crate::domain::{CharacterLabel, ERROR_LABEL};
    use crate::predictor::{AlphabetPipeline, DigitPipeline};
    use ndarray::{Array2, ArrayView4};
    use std::sync::Mutex;

    /// Returns a fixed row and records the batches it was called with.
    #[derive(Debug)]
    struct StubClassifier {
        row: Vec<f32>,
        seen: Mutex<Vec<Array4<f32>>>,
    }

    impl StubClassifier {
        fn new(row: Vec<f32>) -> Self {
            Self {
                row,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Classifier for StubClassifier {
        fn name(&self) -> &str {
            "stub"
        }

        fn input_shape(&self) -> ModelShape {
            ModelShape::image_batch(28, 28, 1)
        }

        fn output_shape(&self) -> ModelShape {
            ModelShape::class_scores(self.row.len())
        }

        fn invoke(&self, batch: ArrayView4<'_, f32>) -> HcrResult<Array2<f32>> {
            self.seen.lock().unwrap().push(batch.to_owned());
            Ok(Array2::from_shape_vec((1, self.row.len()), self.row.clone())?)
        }
    }

    #[derive(Debug)]
    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        fn input_shape(&self) -> ModelShape {
            ModelShape::image_batch(28, 28, 1)
        }

        fn output_shape(&self) -> ModelShape {
            ModelShape::class_scores(26)
        }

        fn invoke(&self, _batch: ArrayView4<'_, f32>) -> HcrResult<Array2<f32>> {
            Err(HcrError::inference_message("failing", "shape mismatch"))
        }
    }

    fn one_hot(arity: usize, index: usize, score: f32) -> Vec<f32> {
        let rest = (1.0 - score) / (arity - 1) as f32;
        (0..arity).map(|i| if i == index { score } else { rest }).collect()
    }

    fn blank_tensor() -> PreprocessedTensor {
        PreprocessedTensor::new(Array2::zeros((28, 28))).unwrap()
    }

    #[test]
    fn test_missing_classifier_is_unavailable() {
        let outcome = PredictionDecoder::default().predict(&blank_tensor(), None, &DigitPipeline);
        assert!(outcome.is_unavailable());
        assert_eq!(outcome.confidence(), 0.0);
        assert_eq!(outcome.label(), None);
    }

    #[test]
    fn test_arity_26_index_25_is_z() {
        let stub = StubClassifier::new(one_hot(26, 25, 0.9));
        let outcome =
            PredictionDecoder::default().predict(&blank_tensor(), Some(&stub), &AlphabetPipeline);
        assert_eq!(outcome.label().as_deref(), Some("Z"));
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn test_arity_27_index_26_is_special() {
        let stub = StubClassifier::new(one_hot(27, 26, 0.8));
        let outcome =
            PredictionDecoder::default().predict(&blank_tensor(), Some(&stub), &AlphabetPipeline);
        let prediction = outcome.prediction().unwrap();
        assert_eq!(prediction.label, CharacterLabel::Special);
        assert_eq!(prediction.arity, 27);
    }

    #[test]
    fn test_other_arity_reports_raw_class() {
        let stub = StubClassifier::new(one_hot(40, 33, 0.7));
        let outcome =
            PredictionDecoder::default().predict(&blank_tensor(), Some(&stub), &AlphabetPipeline);
        assert_eq!(outcome.label().as_deref(), Some("Class_33"));
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let stub = StubClassifier::new(vec![0.1, 0.4, 0.4, 0.1]);
        let outcome =
            PredictionDecoder::default().predict(&blank_tensor(), Some(&stub), &DigitPipeline);
        let prediction = outcome.prediction().unwrap();
        assert_eq!(prediction.class_index, 1);
        assert_eq!(prediction.top_k[0].class_index, 1);
        assert_eq!(prediction.top_k[1].class_index, 2);
    }

    #[test]
    fn test_classifier_error_becomes_failed() {
        let outcome = PredictionDecoder::default().predict(
            &blank_tensor(),
            Some(&FailingClassifier),
            &AlphabetPipeline,
        );
        assert!(outcome.is_failed());
        assert_eq!(outcome.label().as_deref(), Some(ERROR_LABEL));
        assert_eq!(outcome.confidence(), 0.0);
    }

    #[test]
    fn test_non_finite_output_becomes_failed() {
        let stub = StubClassifier::new(vec![0.5, f32::NAN, 0.1]);
        let outcome =
            PredictionDecoder::default().predict(&blank_tensor(), Some(&stub), &DigitPipeline);
        assert!(outcome.is_failed());
    }

    #[test]
    fn test_byte_scale_input_is_rescaled() {
        let stub = StubClassifier::new(one_hot(10, 0, 0.9));
        let values = Array2::from_elem((28, 28), 255.0f32);
        let decoder = PredictionDecoder::default();
        let outcome = decoder.predict_array(values.view(), Some(&stub), &DigitPipeline);
        assert!(!outcome.is_failed());
        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].shape(), &[1, 28, 28, 1]);
        assert!(seen[0].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_unit_scale_input_is_not_rescaled_twice() {
        let stub = StubClassifier::new(one_hot(10, 0, 0.9));
        let values = Array2::from_elem((28, 28), 0.5f32);
        PredictionDecoder::default().predict_array(values.view(), Some(&stub), &DigitPipeline);
        assert!(stub.seen.lock().unwrap()[0].iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_wrong_size_input_is_failed_without_invocation() {
        let stub = StubClassifier::new(one_hot(10, 0, 0.9));
        let values = Array2::<f32>::zeros((20, 20));
        let outcome =
            PredictionDecoder::default().predict_array(values.view(), Some(&stub), &DigitPipeline);
        assert!(outcome.is_failed());
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn test_topk_depth_follows_config() {
        let stub = StubClassifier::new(one_hot(10, 4, 0.6));
        let decoder = PredictionDecoder::new(&DecoderConfig { topk: 5 });
        let outcome = decoder.predict(&blank_tensor(), Some(&stub), &DigitPipeline);
        let prediction = outcome.prediction().unwrap();
        assert_eq!(prediction.top_k.len(), 5);
        assert_eq!(prediction.top_k[0].label.to_string(), "4");
    }
}
