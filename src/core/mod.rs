//! The core of the recognition pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Configuration and validation
//! - Constants used throughout the pipeline
//! - Error handling
//! - The classifier capability
//! - ONNX Runtime inference (with the `onnx` feature)

pub mod config;
pub mod constants;
pub mod errors;
#[cfg(feature = "onnx")]
pub mod inference;
pub mod traits;

pub use config::{
    ConfigError, ConfigValidator, DecoderConfig, QualityConfig, RecognizerConfig, SampleConfig,
};
pub use constants::*;
pub use errors::{HcrError, HcrResult, ProcessingStage};
#[cfg(feature = "onnx")]
pub use inference::OrtClassifier;
pub use traits::{Classifier, ModelShape, Pipeline};

/// Initializes the tracing subscriber for logging.
///
/// Sets up an environment filter (`RUST_LOG`) and a formatting layer.
/// Typically called once at the start of an application.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
