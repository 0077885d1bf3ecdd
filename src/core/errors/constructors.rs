//! Error constructor utilities for the recognition pipeline.
//!
//! Helper functions for creating [`HcrError`] values with context and
//! error chaining.
//!
//! ```rust
//! use oar_hcr::core::HcrError;
//!
//! let error = HcrError::inference(
//!     "stub",
//!     "classifier returned an empty batch",
//!     std::io::Error::new(std::io::ErrorKind::InvalidData, "empty"),
//! );
//! assert!(error.to_string().contains("stub"));
//! ```

use super::types::{HcrError, OpaqueError, ProcessingStage};
use std::path::Path;

impl HcrError {
    /// Internal helper to build a Processing error with minimal boilerplate.
    #[inline]
    fn processing_with_context(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an error for tensor construction or reshaping.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::TensorOperation, context, error)
    }

    /// Creates an error for a failed step of the given stage with a plain message.
    pub fn processing_message(kind: ProcessingStage, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::processing_with_context(kind, message.clone(), OpaqueError(message))
    }

    /// Creates an error for a failed classifier invocation.
    ///
    /// # Arguments
    ///
    /// * `model_name` - Name of the classifier.
    /// * `context` - What the classifier was doing.
    /// * `error` - The underlying error that caused this error.
    pub fn inference(
        model_name: impl Into<String>,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.into(),
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an inference error that has no underlying cause.
    pub fn inference_message(model_name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::inference(model_name, message.clone(), OpaqueError(message))
    }

    /// Creates an error for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an error for configuration problems.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates an error for an unreadable or malformed dataset.
    pub fn dataset(path: &Path, message: impl Into<String>) -> Self {
        Self::Dataset {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
