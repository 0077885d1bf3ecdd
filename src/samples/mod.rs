//! Labeled test samples for when no live image source is available.
//!
//! Alphabet samples come from an ordered chain of tiers. Each tier either
//! produces a full [`SampleSet`] for the requested letters or declines, and
//! the provider walks the chain until one succeeds:
//!
//! 1. [`DatasetTier`] - random rows of a labeled A-Z CSV dataset
//! 2. [`ProceduralTier`] - randomized renderings with system fonts
//! 3. [`ConstantTier`] - fixed bitmaps, always succeeds
//!
//! Digit samples come from MNIST IDX files via [`MnistSamples`].
//!
//! All randomness is drawn from a caller-supplied `RngCore`, so seeding it
//! makes every tier reproducible.

pub mod constant;
pub mod dataset;
pub mod fonts;
pub mod mnist;
pub mod procedural;
pub mod stroke_font;

pub use constant::ConstantTier;
pub use dataset::{DEFAULT_DATASET_FILE, DatasetTier};
pub use fonts::{FontFace, FontLibrary, Glyphs, render_centered, render_letter};
pub use mnist::MnistSamples;
pub use procedural::ProceduralTier;

use crate::core::config::{ConfigValidator, SampleConfig};
use crate::core::errors::HcrResult;
use image::GrayImage;
use rand::RngCore;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// A 28x28 image with its ground-truth label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub label: char,
    pub image: GrayImage,
}

impl LabeledSample {
    pub fn new(label: char, image: GrayImage) -> Self {
        Self { label, image }
    }
}

/// Identifies which tier produced a sample set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleTierKind {
    Dataset,
    Procedural,
    Constant,
    /// MNIST digit samples (not part of the alphabet chain).
    Mnist,
}

impl fmt::Display for SampleTierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SampleTierKind::Dataset => "dataset",
            SampleTierKind::Procedural => "procedural",
            SampleTierKind::Constant => "constant",
            SampleTierKind::Mnist => "mnist",
        })
    }
}

/// Ordered labeled samples from exactly one tier.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    tier: SampleTierKind,
    samples: Vec<LabeledSample>,
}

impl SampleSet {
    pub fn new(tier: SampleTierKind, samples: Vec<LabeledSample>) -> Self {
        Self { tier, samples }
    }

    pub fn tier(&self) -> SampleTierKind {
        self.tier
    }

    pub fn samples(&self) -> &[LabeledSample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<LabeledSample> {
        self.samples
    }

    /// The image for a label, if present.
    pub fn get(&self, label: char) -> Option<&GrayImage> {
        self.samples
            .iter()
            .find(|s| s.label == label)
            .map(|s| &s.image)
    }

    pub fn labels(&self) -> Vec<char> {
        self.samples.iter().map(|s| s.label).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One stage of the alphabet sample chain.
pub trait SampleTier: Send + Sync + fmt::Debug {
    fn kind(&self) -> SampleTierKind;

    /// Produces samples for every requested letter, or `None` if this tier
    /// cannot serve the request.
    fn try_load(&self, letters: &[char], rng: &mut dyn RngCore) -> Option<SampleSet>;
}

/// Walks the tier chain until one produces samples.
#[derive(Debug)]
pub struct SampleProvider {
    tiers: Vec<Box<dyn SampleTier>>,
    terminal: ConstantTier,
}

impl SampleProvider {
    /// Creates a provider that tries `tiers` in order, then `terminal`.
    pub fn new(tiers: Vec<Box<dyn SampleTier>>, terminal: ConstantTier) -> Self {
        Self { tiers, terminal }
    }

    /// Builds the standard dataset, procedural, constant chain with
    /// discovered system fonts.
    ///
    /// Without a configured dataset path the dataset tier looks for
    /// [`DEFAULT_DATASET_FILE`] in the working directory.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn from_config(config: &SampleConfig) -> HcrResult<Self> {
        config.validate()?;
        Ok(Self::standard_chain(config, FontLibrary::discover(config)))
    }

    /// Builds the standard chain around an explicit font library.
    ///
    /// The procedural tier falls back to the stroke font when `fonts` is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn with_fonts(config: &SampleConfig, fonts: FontLibrary) -> HcrResult<Self> {
        config.validate()?;
        Ok(Self::standard_chain(config, fonts))
    }

    fn standard_chain(config: &SampleConfig, fonts: FontLibrary) -> Self {
        let dataset_path = config
            .dataset_path
            .clone()
            .unwrap_or_else(|| DEFAULT_DATASET_FILE.into());

        let tiers: Vec<Box<dyn SampleTier>> = vec![
            Box::new(DatasetTier::new(dataset_path, fonts.clone(), config.fallback_font_size)),
            Box::new(ProceduralTier::new(fonts.clone(), config.clone()).with_stroke_fallback()),
        ];
        Self::new(tiers, ConstantTier::new(fonts, config.fallback_font_size))
    }

    /// Returns samples for the requested letters and the tier that served them.
    ///
    /// Letters are upper-cased and de-duplicated in request order; anything
    /// that is not an ASCII letter is dropped. Never fails: the constant tier
    /// always produces a set.
    pub fn get_samples(
        &self,
        letters: &[char],
        rng: &mut dyn RngCore,
    ) -> (SampleSet, SampleTierKind) {
        let letters = normalize_letters(letters);

        for tier in &self.tiers {
            match tier.try_load(&letters, rng) {
                Some(set) => {
                    info!("Loaded {} samples from {} tier", set.len(), tier.kind());
                    return (set, tier.kind());
                }
                None => debug!("{} tier unavailable, falling through", tier.kind()),
            }
        }

        let set = self.terminal.load(&letters);
        info!("Loaded {} samples from constant tier", set.len());
        (set, SampleTierKind::Constant)
    }
}

fn normalize_letters(letters: &[char]) -> Vec<char> {
    let mut out: Vec<char> = Vec::with_capacity(letters.len());
    for &c in letters {
        if !c.is_ascii_alphabetic() {
            warn!("Ignoring non-letter sample request {:?}", c);
            continue;
        }
        let upper = c.to_ascii_uppercase();
        if !out.contains(&upper) {
            out.push(upper);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DEFAULT_SAMPLE_LETTERS;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::PathBuf;

    #[derive(Debug)]
    struct Declining;

    impl SampleTier for Declining {
        fn kind(&self) -> SampleTierKind {
            SampleTierKind::Dataset
        }

        fn try_load(&self, _letters: &[char], _rng: &mut dyn RngCore) -> Option<SampleSet> {
            None
        }
    }

    fn procedural_with_stroke_font() -> ProceduralTier {
        ProceduralTier::new(FontLibrary::empty(), SampleConfig::default()).with_stroke_fallback()
    }

    #[test]
    fn test_normalize_letters() {
        assert_eq!(normalize_letters(&['a', 'B', 'A', '3', 'c']), vec!['A', 'B', 'C']);
    }

    #[test]
    fn test_missing_dataset_falls_to_procedural() {
        let tiers: Vec<Box<dyn SampleTier>> = vec![
            Box::new(DatasetTier::new(
                PathBuf::from("/nonexistent/A_Z Handwritten Data.csv"),
                FontLibrary::empty(),
                18,
            )),
            Box::new(procedural_with_stroke_font()),
        ];
        let provider = SampleProvider::new(tiers, ConstantTier::new(FontLibrary::empty(), 18));
        let mut rng = StdRng::seed_from_u64(7);

        let (set, tier) = provider.get_samples(&DEFAULT_SAMPLE_LETTERS, &mut rng);
        assert_eq!(tier, SampleTierKind::Procedural);
        assert_eq!(set.tier(), SampleTierKind::Procedural);
        assert_eq!(set.labels(), DEFAULT_SAMPLE_LETTERS.to_vec());
    }

    #[test]
    fn test_all_tiers_declining_reaches_constant() {
        let tiers: Vec<Box<dyn SampleTier>> = vec![
            Box::new(Declining),
            Box::new(ProceduralTier::new(FontLibrary::empty(), SampleConfig::default())),
        ];
        let provider = SampleProvider::new(tiers, ConstantTier::new(FontLibrary::empty(), 18));
        let mut rng = StdRng::seed_from_u64(1);

        let (set, tier) = provider.get_samples(&['B', 'M', 'Q'], &mut rng);
        assert_eq!(tier, SampleTierKind::Constant);
        assert_eq!(set.len(), 3);
        for sample in set.samples() {
            assert_eq!(sample.image.dimensions(), (28, 28));
        }
    }

    #[test]
    fn test_standard_chain_without_fonts_or_dataset_is_procedural() {
        let config = SampleConfig {
            dataset_path: Some(PathBuf::from("/nonexistent/A_Z Handwritten Data.csv")),
            ..SampleConfig::default()
        };
        let provider = SampleProvider::with_fonts(&config, FontLibrary::empty()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let (set, tier) = provider.get_samples(&['A', 'B', 'C', 'D', 'E'], &mut rng);
        assert_eq!(tier, SampleTierKind::Procedural);
        assert_eq!(set.labels(), vec!['A', 'B', 'C', 'D', 'E']);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SampleConfig {
            max_rotation_degrees: i32::MIN,
            ..SampleConfig::default()
        };
        let err = SampleProvider::with_fonts(&config, FontLibrary::empty()).unwrap_err();
        assert!(err.to_string().contains("max_rotation_degrees"));
        assert!(SampleProvider::from_config(&config).is_err());
    }

    #[test]
    fn test_sample_set_lookup() {
        let set = SampleSet::new(
            SampleTierKind::Constant,
            vec![LabeledSample::new('B', GrayImage::new(28, 28))],
        );
        assert!(set.get('B').is_some());
        assert!(set.get('C').is_none());
        assert!(!set.is_empty());
    }
}
