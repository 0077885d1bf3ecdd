//! Image processing stages of the recognition pipeline.
//!
//! # Modules
//!
//! * `preprocess` - Grayscale, binarize, polarity, resize and scale to a 28x28 tensor
//! * `quality` - Advisory quality scoring of grayscale captures
//! * `resize` - Area-averaging resize
//! * `topk` - Top-k selection over probability rows

pub mod preprocess;
pub mod quality;
pub mod resize;
pub mod topk;

pub use preprocess::{
    PolarityPolicy, PreprocessedTensor, PreprocessingTrace, Preprocessor, StageBuffer, TraceStage,
    preprocess, threshold,
};
pub use quality::{QualityAssessor, QualityBand, QualityIssue, QualityReport};
pub use resize::resize_area;
pub use topk::{Topk, TopkResult};
