//! The classifier capability consumed by the prediction decoder.
//!
//! A classifier is supplied by the caller already loaded. The crate never
//! trains, builds or persists models; it only invokes them with a batch of
//! normalized 28x28 single-channel tensors and reads the probability rows
//! they return.
//!
//! ```text
//! batch: f32[N, 28, 28, 1]  ──invoke──▶  probabilities: f32[N, C]
//! ```
//!
//! `C` (the arity) is read from the returned rows at call time; the declared
//! [`Classifier::output_shape`] is only informational.

use crate::core::errors::HcrResult;
use ndarray::{Array2, ArrayView4};
use std::fmt::{self, Debug, Display};

/// A tensor shape where `None` marks a dynamic dimension (usually the batch).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelShape(pub Vec<Option<usize>>);

impl ModelShape {
    /// Creates a shape from optional dimensions.
    pub fn new(dims: impl Into<Vec<Option<usize>>>) -> Self {
        Self(dims.into())
    }

    /// The `(None, 28, 28, 1)` image batch layout.
    pub fn image_batch(height: usize, width: usize, channels: usize) -> Self {
        Self(vec![None, Some(height), Some(width), Some(channels)])
    }

    /// The `(None, classes)` probability layout.
    pub fn class_scores(classes: usize) -> Self {
        Self(vec![None, Some(classes)])
    }

    /// Returns the dimensions.
    pub fn dims(&self) -> &[Option<usize>] {
        &self.0
    }

    /// Number of classes encoded by an output shape (its last static dimension).
    pub fn arity(&self) -> Option<usize> {
        self.0.last().copied().flatten()
    }
}

impl Display for ModelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match dim {
                Some(d) => write!(f, "{d}")?,
                None => f.write_str("None")?,
            }
        }
        f.write_str(")")
    }
}

/// Trait for an already-loaded character classifier.
///
/// Implementations must tolerate concurrent read-only use if the caller
/// shares them across threads; this crate adds no locking of its own.
pub trait Classifier: Send + Sync + Debug {
    /// Human-readable model name used in logs and reports.
    fn name(&self) -> &str;

    /// Declared input layout, typically `(None, 28, 28, 1)`.
    fn input_shape(&self) -> ModelShape;

    /// Declared output layout, typically `(None, C)`.
    fn output_shape(&self) -> ModelShape;

    /// Runs the model on a batch and returns one probability row per item.
    fn invoke(&self, batch: ArrayView4<'_, f32>) -> HcrResult<Array2<f32>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_display_matches_keras_style() {
        let shape = ModelShape::image_batch(28, 28, 1);
        assert_eq!(shape.to_string(), "(None, 28, 28, 1)");
        assert_eq!(ModelShape::class_scores(26).to_string(), "(None, 26)");
    }

    #[test]
    fn test_arity_reads_last_dimension() {
        assert_eq!(ModelShape::class_scores(27).arity(), Some(27));
        assert_eq!(ModelShape::new(vec![None, None]).arity(), None);
        assert_eq!(ModelShape::default().arity(), None);
    }
}
