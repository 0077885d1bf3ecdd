//! Error type definitions for the recognition pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Enum representing the stages of the recognition pipeline.
///
/// Used to identify where a processing error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Grayscale conversion of the raw input.
    Grayscale,
    /// Fixed-threshold binarization.
    Threshold,
    /// Area-averaging resize to the model grid.
    Resize,
    /// Scaling integer samples into the unit range.
    Normalization,
    /// Tensor reshaping or construction.
    TensorOperation,
    /// Mapping classifier outputs to labels.
    Decoding,
    /// Sample acquisition (dataset, rendering, constants).
    SampleGeneration,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Grayscale => write!(f, "grayscale conversion"),
            ProcessingStage::Threshold => write!(f, "threshold"),
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Decoding => write!(f, "decoding"),
            ProcessingStage::SampleGeneration => write!(f, "sample generation"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Errors surfaced at the boundaries the caller owns.
///
/// The recognition path itself degrades to explicit "unavailable" or
/// "error" outcomes instead of returning these.
#[derive(Error, Debug)]
pub enum HcrError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error raised by a classifier invocation.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the classifier that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// A reference dataset could not be read or is malformed.
    #[error("dataset '{}': {message}", path.display())]
    Dataset {
        /// Path of the dataset resource.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[cfg(feature = "onnx")]
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// A plain message error used as the source of errors that have no
/// underlying cause of their own.
#[derive(Debug, Clone)]
pub struct OpaqueError(pub String);

impl std::fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for OpaqueError {}
