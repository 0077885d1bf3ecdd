//! Trait definitions for the recognition pipeline.
//!
//! - [`classifier`]: the opaque model capability the decoder invokes.
//! - [`pipeline`]: mode-specific preprocessing and label decoding.

pub mod classifier;
pub mod pipeline;

pub use classifier::{Classifier, ModelShape};
pub use pipeline::Pipeline;
