//! Error types for the recognition pipeline.
//!
//! The recognition path (quality check, preprocessing, decoding) never
//! raises for missing models or failing classifiers; it reports explicit
//! outcomes instead. The types here cover the boundaries the caller owns:
//! loading images, configurations, datasets and models.

pub mod constructors;
pub mod types;

pub use types::{HcrError, OpaqueError, ProcessingStage};

/// Convenient result alias for recognition operations.
pub type HcrResult<T> = Result<T, HcrError>;
