//! ONNX Runtime backed [`Classifier`].
//!
//! Loads an exported digit or letter model and runs it on the normalized
//! `[N, 28, 28, 1]` batch. Only built with the `onnx` feature.

use crate::core::errors::{HcrError, HcrResult};
use crate::core::traits::{Classifier, ModelShape};
use ndarray::{Array2, ArrayView4};
use ort::logging::LogLevel;
use ort::session::{Session, SessionInputs};
use ort::value::{TensorRef, ValueType};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

const SESSION_CREATION_FAILURE: &str = "failed to create ONNX session";

pub struct OrtClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_shape: ModelShape,
    output_shape: ModelShape,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtClassifier")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtClassifier {
    /// Loads a model file. The first input and output of the graph are used.
    ///
    /// # Errors
    ///
    /// Returns an inference error if the session cannot be created or the
    /// graph has no inputs or outputs.
    pub fn load(model_path: impl AsRef<Path>) -> HcrResult<Self> {
        let path = model_path.as_ref();
        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        let session_error = |e: &dyn std::fmt::Display| {
            HcrError::inference_message(&model_name, format!("{SESSION_CREATION_FAILURE}: {e}"))
        };
        let builder = Session::builder().map_err(|e| session_error(&e))?;
        let mut builder = builder
            .with_log_level(LogLevel::Error)
            .map_err(|e| session_error(&e))?;
        let session = builder
            .commit_from_file(path)
            .map_err(|e| session_error(&e))?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| HcrError::inference_message(&model_name, "model has no inputs"))?;
        let output = session
            .outputs()
            .first()
            .ok_or_else(|| HcrError::inference_message(&model_name, "model has no outputs"))?;

        let input_name = input.name().to_string();
        let output_name = output.name().to_string();
        let input_shape = shape_of(input.dtype());
        let output_shape = shape_of(output.dtype());

        info!(
            "Loaded classifier '{}' from {}: input {} -> output {}",
            model_name,
            path.display(),
            input_shape,
            output_shape
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_shape,
            output_shape,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Classifier for OrtClassifier {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn input_shape(&self) -> ModelShape {
        self.input_shape.clone()
    }

    fn output_shape(&self) -> ModelShape {
        self.output_shape.clone()
    }

    fn invoke(&self, batch: ArrayView4<'_, f32>) -> HcrResult<Array2<f32>> {
        let contiguous = batch.as_standard_layout();
        let dims: Vec<i64> = contiguous.shape().iter().map(|&d| d as i64).collect();
        let data = contiguous.as_slice().ok_or_else(|| {
            HcrError::inference_message(&self.model_name, "input batch is not contiguous")
        })?;
        let input_tensor = TensorRef::from_array_view((dims, data)).map_err(|e| {
            HcrError::inference_message(&self.model_name, format!("tensor conversion: {e}"))
        })?;

        let mut session = self.session.lock().map_err(|_| {
            HcrError::inference_message(&self.model_name, "session lock poisoned")
        })?;
        let inputs: SessionInputs<'_, '_, 0> = SessionInputs::ValueMap(vec![(
            Cow::Borrowed(self.input_name.as_str()),
            input_tensor.into(),
        )]);
        let outputs = session.run(inputs).map_err(|e| {
            HcrError::inference_message(&self.model_name, format!("forward pass: {e}"))
        })?;

        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                HcrError::inference_message(&self.model_name, format!("output extraction: {e}"))
            })?;
        let dims: Vec<i64> = shape.iter().copied().collect();
        probabilities(&self.model_name, &dims, data)
    }
}

/// Reshapes a raw output tensor into `[rows, classes]`.
///
/// A 1-D output is treated as a single row.
fn probabilities(model_name: &str, dims: &[i64], data: &[f32]) -> HcrResult<Array2<f32>> {
    let dims: Vec<usize> = dims.iter().map(|&d| d.max(0) as usize).collect();
    let (rows, cols) = match dims.as_slice() {
        [rows, cols] => (*rows, *cols),
        [cols] => (1, *cols),
        other => {
            return Err(HcrError::inference_message(
                model_name,
                format!("expected 2D probabilities, got shape {other:?}"),
            ));
        }
    };
    Ok(Array2::from_shape_vec((rows, cols), data.to_vec())?)
}

fn shape_of(value_type: &ValueType) -> ModelShape {
    match value_type {
        ValueType::Tensor { shape, .. } => {
            let dims: Vec<Option<usize>> = shape.iter().map(|&d| usize::try_from(d).ok()).collect();
            ModelShape::new(dims)
        }
        _ => ModelShape::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_model_file_fails() {
        let err = OrtClassifier::load("/nonexistent/mnist.onnx").unwrap_err();
        assert!(matches!(err, HcrError::Inference { .. }));
        assert!(err.to_string().contains("mnist"));
    }

    #[test]
    fn test_garbage_model_file_fails() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a protobuf graph").unwrap();
        let err = OrtClassifier::load(file.path()).unwrap_err();
        assert!(matches!(err, HcrError::Inference { .. }));
    }

    #[test]
    fn test_probabilities_accepts_batch_and_flat_outputs() {
        let batch = probabilities("m", &[1, 3], &[0.1, 0.7, 0.2]).unwrap();
        assert_eq!(batch.dim(), (1, 3));
        assert_eq!(batch[[0, 1]], 0.7);

        let flat = probabilities("m", &[10], &[0.1; 10]).unwrap();
        assert_eq!(flat.dim(), (1, 10));
    }

    #[test]
    fn test_probabilities_rejects_other_ranks() {
        let err = probabilities("m", &[1, 2, 2], &[0.0; 4]).unwrap_err();
        assert!(err.to_string().contains("'m'"));
        assert!(probabilities("m", &[2, 3], &[0.0; 5]).is_err());
    }
}
