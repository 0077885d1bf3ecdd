//! Per-mode classifier slots.
//!
//! The registry never loads models itself. Callers register classifiers they
//! have already built, or mark a slot unavailable with the reason loading
//! failed; either way every mode always has a slot to report on.

use crate::core::traits::{Classifier, ModelShape};
use crate::domain::Mode;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Introspection record of a classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ModelInfo {
    Loaded {
        name: String,
        input_shape: String,
        output_shape: String,
        /// Last output dimension, if static.
        num_classes: Option<usize>,
    },
    NotLoaded,
}

impl fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelInfo::Loaded {
                name,
                input_shape,
                output_shape,
                num_classes,
            } => {
                write!(f, "{name}: input {input_shape}, output {output_shape}, classes ")?;
                match num_classes {
                    Some(n) => write!(f, "{n}"),
                    None => f.write_str("Unknown"),
                }
            }
            ModelInfo::NotLoaded => f.write_str("Model not loaded"),
        }
    }
}

/// Describes a classifier's declared shapes.
pub fn describe_classifier(classifier: Option<&dyn Classifier>) -> ModelInfo {
    let Some(classifier) = classifier else {
        return ModelInfo::NotLoaded;
    };
    let output: ModelShape = classifier.output_shape();
    ModelInfo::Loaded {
        name: classifier.name().to_string(),
        input_shape: classifier.input_shape().to_string(),
        output_shape: output.to_string(),
        num_classes: output.arity(),
    }
}

/// One mode's classifier with its display metadata.
#[derive(Debug, Clone)]
pub struct ModelSlot {
    name: String,
    info: String,
    classifier: Option<Arc<dyn Classifier>>,
}

impl ModelSlot {
    /// A slot holding a loaded classifier.
    pub fn loaded(
        name: impl Into<String>,
        info: impl Into<String>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            name: name.into(),
            info: info.into(),
            classifier: Some(classifier),
        }
    }

    /// A slot whose classifier could not be obtained.
    pub fn unavailable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            info: reason.into(),
            classifier: None,
        }
    }

    /// Display name, suffixed with `(Not Available)` for empty slots.
    pub fn display_name(&self) -> String {
        if self.classifier.is_some() {
            self.name.clone()
        } else {
            format!("{} (Not Available)", self.name)
        }
    }

    /// Description of the model, or the reason it is unavailable.
    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn classifier(&self) -> Option<&dyn Classifier> {
        self.classifier.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn describe(&self) -> ModelInfo {
        describe_classifier(self.classifier())
    }
}

/// Classifier slots for both modes.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    digit: ModelSlot,
    alphabet: ModelSlot,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self {
            digit: ModelSlot::unavailable(default_name(Mode::Digit), "no classifier registered"),
            alphabet: ModelSlot::unavailable(
                default_name(Mode::Alphabet),
                "no classifier registered",
            ),
        }
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a classifier for a mode under the default display name.
    pub fn with_classifier(mut self, mode: Mode, classifier: Arc<dyn Classifier>) -> Self {
        let slot = ModelSlot::loaded(default_name(mode), default_info(mode), classifier);
        self.set_slot(mode, slot);
        self
    }

    /// Replaces a mode's slot.
    pub fn with_slot(mut self, mode: Mode, slot: ModelSlot) -> Self {
        self.set_slot(mode, slot);
        self
    }

    pub fn set_slot(&mut self, mode: Mode, slot: ModelSlot) {
        match mode {
            Mode::Digit => self.digit = slot,
            Mode::Alphabet => self.alphabet = slot,
        }
    }

    pub fn slot(&self, mode: Mode) -> &ModelSlot {
        match mode {
            Mode::Digit => &self.digit,
            Mode::Alphabet => &self.alphabet,
        }
    }

    pub fn classifier(&self, mode: Mode) -> Option<&dyn Classifier> {
        self.slot(mode).classifier()
    }

    /// Returns `true` if at least one mode can predict.
    pub fn any_available(&self) -> bool {
        Mode::ALL.iter().any(|&m| self.slot(m).is_available())
    }
}

fn default_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Digit => "MNIST CNN Model",
        Mode::Alphabet => "Alphabet Model",
    }
}

fn default_info(mode: Mode) -> &'static str {
    match mode {
        Mode::Digit => "Convolutional Neural Network for Digit Recognition (0-9)",
        Mode::Alphabet => "Deep Learning Model for Alphabet Recognition (A-Z)",
    }
}
