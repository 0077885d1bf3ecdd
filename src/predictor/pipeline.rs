//! The two recognition pipelines.

use crate::core::traits::Pipeline;
use crate::domain::{CharacterLabel, Mode, decode_digit, decode_letter};
use crate::processors::PolarityPolicy;

/// Digits 0-9: always inverts, labels are decimal indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitPipeline;

impl Pipeline for DigitPipeline {
    fn mode(&self) -> Mode {
        Mode::Digit
    }

    fn polarity(&self) -> PolarityPolicy {
        PolarityPolicy::Always
    }

    fn decode_label(&self, class_index: usize, _arity: usize) -> CharacterLabel {
        decode_digit(class_index)
    }
}

/// Letters A-Z: inverts light backgrounds only, labels depend on arity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphabetPipeline;

impl Pipeline for AlphabetPipeline {
    fn mode(&self) -> Mode {
        Mode::Alphabet
    }

    fn polarity(&self) -> PolarityPolicy {
        PolarityPolicy::WhenLightBackground
    }

    fn decode_label(&self, class_index: usize, arity: usize) -> CharacterLabel {
        decode_letter(class_index, arity)
    }
}

static DIGIT_PIPELINE: DigitPipeline = DigitPipeline;
static ALPHABET_PIPELINE: AlphabetPipeline = AlphabetPipeline;

/// Selects the pipeline for a mode.
pub fn pipeline_for(mode: Mode) -> &'static dyn Pipeline {
    match mode {
        Mode::Digit => &DIGIT_PIPELINE,
        Mode::Alphabet => &ALPHABET_PIPELINE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    #[test]
    fn test_pipeline_for_mode() {
        for mode in Mode::ALL {
            assert_eq!(pipeline_for(mode).mode(), mode);
        }
    }

    #[test]
    fn test_polarity_matches_mode() {
        assert_eq!(pipeline_for(Mode::Digit).polarity(), PolarityPolicy::Always);
        assert_eq!(
            pipeline_for(Mode::Alphabet).polarity(),
            PolarityPolicy::WhenLightBackground
        );
    }

    #[test]
    fn test_decode_differs_by_mode() {
        assert_eq!(DigitPipeline.decode_label(3, 10).to_string(), "3");
        assert_eq!(AlphabetPipeline.decode_label(3, 26).to_string(), "D");
        assert_eq!(AlphabetPipeline.decode_label(26, 27), CharacterLabel::Special);
    }

    #[test]
    fn test_default_preprocess_uses_polarity() {
        let black = DynamicImage::ImageLuma8(GrayImage::from_pixel(28, 28, Luma([0])));
        let (_, trace) = DigitPipeline.preprocess(&black).unwrap();
        assert!(trace.polarity_inverted());
        let (_, trace) = AlphabetPipeline.preprocess(&black).unwrap();
        assert!(!trace.polarity_inverted());
    }
}
