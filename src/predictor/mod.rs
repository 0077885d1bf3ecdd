//! Prediction: mode pipelines, the model registry, the decoder and the
//! end-to-end [`Recognizer`].

pub mod decoder;
pub mod pipeline;
pub mod recognizer;
pub mod registry;

pub use decoder::PredictionDecoder;
pub use pipeline::{AlphabetPipeline, DigitPipeline, pipeline_for};
pub use recognizer::{
    EvaluationReport, Recognition, Recognizer, RecognizerBuilder, SampleEvaluation,
};
pub use registry::{ModelInfo, ModelRegistry, ModelSlot, describe_classifier};
