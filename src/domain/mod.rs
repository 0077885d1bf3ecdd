//! Domain-level structures shared across the recognition pipeline.
//!
//! Modes, decoded labels and prediction outcomes.

pub mod label;
pub mod mode;
pub mod prediction;

pub use label::*;
pub use mode::*;
pub use prediction::*;
