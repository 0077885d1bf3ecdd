//! Constants shared across the recognition pipeline.
//!
//! The binarization threshold and the model grid size are part of the
//! contract with the trained classifiers and are therefore not configurable.

/// Side length of the square model grid (MNIST / EMNIST layout).
pub const MODEL_INPUT_SIZE: u32 = 28;

/// Number of values in a preprocessed tensor.
pub const MODEL_INPUT_LEN: usize = (MODEL_INPUT_SIZE * MODEL_INPUT_SIZE) as usize;

/// Fixed global binarization threshold. Samples `>=` this become 255.
pub const BINARY_THRESHOLD: u8 = 127;

/// Mean intensity above which a binarized alphabet image is treated as
/// light-background and inverted.
pub const POLARITY_MEAN_THRESHOLD: f64 = 127.0;

/// Points awarded by each of the four quality sub-checks.
pub const QUALITY_CHECK_POINTS: u8 = 25;

/// Number of letter classes (A-Z).
pub const LETTER_CLASSES: usize = 26;

/// Number of digit classes (0-9).
pub const DIGIT_CLASSES: usize = 10;

/// The default number of ranked classes kept with each prediction.
pub const DEFAULT_TOPK: usize = 3;

/// The default threshold for parallel processing.
///
/// Batches with more items than this are processed with rayon.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Letters requested from the sample provider when the caller has no
/// preference; the authoritative tier serves exactly these.
pub const DEFAULT_SAMPLE_LETTERS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];
