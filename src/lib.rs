//! # OAR HCR
//!
//! Handwritten character recognition for single digits and letters.
//!
//! The crate turns a photographed or drawn character into the 28x28
//! normalized tensor an MNIST-style classifier expects, runs a
//! caller-supplied classifier on it and decodes the result into a label
//! with a confidence and ranked alternatives.
//!
//! ## Features
//!
//! - Heuristic image quality scoring with actionable recommendations
//! - Mode-specific preprocessing with an inspectable stage trace
//! - Model registry with explicit "not available" states
//! - Prediction decoding with top-k ranking
//! - Labeled test samples from datasets, procedural rendering or
//!   built-in bitmaps
//! - ONNX Runtime classifier (`onnx` feature)
//!
//! ## Modules
//!
//! * [`core`] - Configuration, constants, errors and the classifier trait
//! * [`domain`] - Modes, labels and prediction outcomes
//! * [`processors`] - Quality assessment, preprocessing, resizing, top-k
//! * [`predictor`] - Mode pipelines, model registry, decoder, recognizer
//! * [`samples`] - Labeled sample providers
//! * [`utils`] - Image loading helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oar_hcr::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Without a registered classifier the outcome is "unavailable",
//! // but quality and preprocessing still run.
//! let recognizer = Recognizer::builder().build()?;
//!
//! let image = load_image(Path::new("digit.png"))?;
//! let recognition = recognizer.recognize(&image, Mode::Digit)?;
//!
//! println!("quality: {}", recognition.quality.score);
//! println!("label: {:?}", recognition.label());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod predictor;
pub mod processors;
pub mod samples;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use oar_hcr::prelude::*;
/// ```
///
/// Included items cover the common path:
/// - Recognition (`Recognizer`, `RecognizerBuilder`, `Recognition`)
/// - Modes and outcomes (`Mode`, `Prediction`, `PredictionOutcome`)
/// - The classifier seam (`Classifier`, `ModelShape`, `ModelRegistry`)
/// - Configuration (`RecognizerConfig`)
/// - Errors (`HcrError`, `HcrResult`)
/// - Image loading (`load_image`)
pub mod prelude {
    pub use crate::core::{Classifier, HcrError, HcrResult, ModelShape, RecognizerConfig};
    pub use crate::domain::{Mode, Prediction, PredictionOutcome};
    pub use crate::predictor::{ModelRegistry, Recognition, Recognizer, RecognizerBuilder};
    pub use crate::processors::{QualityBand, QualityReport};
    pub use crate::utils::load_image;
}
