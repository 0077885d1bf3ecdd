//! Prediction results returned by the decoder.

use super::label::CharacterLabel;
use serde::{Deserialize, Serialize};

/// Label reported for predictions whose classifier invocation failed.
pub const ERROR_LABEL: &str = "Error";

/// One entry of the ranked class list kept with a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedClass {
    pub class_index: usize,
    pub label: CharacterLabel,
    pub score: f32,
}

/// A successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Decoded label of the arg-max class.
    pub label: CharacterLabel,
    /// Maximum entry of the probability row, in `[0, 1]`.
    pub confidence: f32,
    /// Arg-max index (lowest index wins ties).
    pub class_index: usize,
    /// Length of the probability row.
    pub arity: usize,
    /// Highest scoring classes, best first.
    pub top_k: Vec<RankedClass>,
}

impl Prediction {
    /// Returns the label as display text.
    pub fn label_text(&self) -> String {
        self.label.to_string()
    }

    /// Case-insensitive comparison against a ground-truth label.
    pub fn matches(&self, expected: &str) -> bool {
        self.label_text().eq_ignore_ascii_case(expected.trim())
    }
}

/// Outcome of a prediction request.
///
/// A missing classifier and a failing classifier are both reported as
/// values, never as errors, so callers can always render something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PredictionOutcome {
    /// The classifier ran and its output was decoded.
    Predicted(Prediction),
    /// No classifier was supplied; nothing was invoked.
    Unavailable,
    /// The classifier was invoked but failed or produced unusable output.
    Failed { reason: String },
}

impl PredictionOutcome {
    /// Label text: the decoded label, [`ERROR_LABEL`] for failures,
    /// `None` when no classifier was available.
    pub fn label(&self) -> Option<String> {
        match self {
            PredictionOutcome::Predicted(p) => Some(p.label_text()),
            PredictionOutcome::Unavailable => None,
            PredictionOutcome::Failed { .. } => Some(ERROR_LABEL.to_string()),
        }
    }

    /// Confidence of the prediction, `0.0` for every non-prediction.
    pub fn confidence(&self) -> f32 {
        match self {
            PredictionOutcome::Predicted(p) => p.confidence,
            _ => 0.0,
        }
    }

    /// Returns the prediction if the classifier produced one.
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            PredictionOutcome::Predicted(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, PredictionOutcome::Unavailable)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PredictionOutcome::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter_prediction(letter: char, confidence: f32) -> Prediction {
        Prediction {
            label: CharacterLabel::Letter(letter),
            confidence,
            class_index: (letter as u8 - b'A') as usize,
            arity: 26,
            top_k: Vec::new(),
        }
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let prediction = letter_prediction('B', 0.8);
        assert!(prediction.matches("b"));
        assert!(prediction.matches("B "));
        assert!(!prediction.matches("C"));
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = PredictionOutcome::Predicted(letter_prediction('Q', 0.6));
        assert_eq!(ok.label().as_deref(), Some("Q"));
        assert_eq!(ok.confidence(), 0.6);

        let missing = PredictionOutcome::Unavailable;
        assert_eq!(missing.label(), None);
        assert_eq!(missing.confidence(), 0.0);
        assert!(missing.is_unavailable());

        let failed = PredictionOutcome::Failed {
            reason: "boom".to_string(),
        };
        assert_eq!(failed.label().as_deref(), Some(ERROR_LABEL));
        assert_eq!(failed.confidence(), 0.0);
        assert!(failed.is_failed());
    }
}
