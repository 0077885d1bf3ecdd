//! Procedural tier: letters rendered with randomized font, size, position,
//! noise and rotation to imitate handwriting variance.

use super::fonts::{FontLibrary, Glyphs, render_letter};
use super::{LabeledSample, SampleSet, SampleTier, SampleTierKind};
use crate::core::config::SampleConfig;
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::noise::gaussian_noise_mut;
use rand::{Rng, RngCore};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ProceduralTier {
    fonts: FontLibrary,
    config: SampleConfig,
    stroke_fallback: bool,
}

impl ProceduralTier {
    /// Creates a tier that declines when `fonts` has no faces.
    pub fn new(fonts: FontLibrary, config: SampleConfig) -> Self {
        Self {
            fonts,
            config,
            stroke_fallback: false,
        }
    }

    /// Lets the tier render with the stroke font when no face is loaded.
    pub fn with_stroke_fallback(mut self) -> Self {
        self.stroke_fallback = true;
        self
    }

    /// Renders one randomized sample of `letter`.
    pub fn render(&self, letter: char, rng: &mut dyn RngCore) -> GrayImage {
        let cfg = &self.config;
        let glyphs: Glyphs<'_> = self.fonts.choose(rng);
        let size = rng.random_range(cfg.min_font_size..=cfg.max_font_size.max(cfg.min_font_size));
        let jitter = cfg.max_jitter.max(0);
        let offset = (
            rng.random_range(-jitter..=jitter),
            rng.random_range(-jitter..=jitter),
        );

        let mut image = render_letter(glyphs, letter, size, offset);

        if rng.random_bool(cfg.noise_probability.clamp(0.0, 1.0)) {
            add_gaussian_noise(&mut image, cfg.noise_sigma, rng);
        }

        if rng.random_bool(cfg.rotation_probability.clamp(0.0, 1.0)) {
            let max = cfg.max_rotation_degrees.unsigned_abs().min(180) as i32;
            let degrees = rng.random_range(-max..=max);
            // positive angles turn counter-clockwise
            image = rotate_about_center(
                &image,
                -(degrees as f32).to_radians(),
                Interpolation::Nearest,
                Luma([0]),
            );
        }

        image
    }
}

impl SampleTier for ProceduralTier {
    fn kind(&self) -> SampleTierKind {
        SampleTierKind::Procedural
    }

    fn try_load(&self, letters: &[char], rng: &mut dyn RngCore) -> Option<SampleSet> {
        if self.fonts.is_empty() && !self.stroke_fallback {
            debug!("No fonts available for procedural samples");
            return None;
        }
        let samples = letters
            .iter()
            .map(|&letter| LabeledSample::new(letter, self.render(letter, rng)))
            .collect();
        Some(SampleSet::new(SampleTierKind::Procedural, samples))
    }
}

/// Adds zero-mean Gaussian noise and clips to 0-255.
///
/// The noise stream is seeded from `rng`. Non-positive or NaN `sigma`
/// leaves the image unchanged.
pub fn add_gaussian_noise(image: &mut GrayImage, sigma: f64, rng: &mut dyn RngCore) {
    if sigma.is_nan() || sigma <= 0.0 {
        return;
    }
    gaussian_noise_mut(image, 0.0, sigma, rng.random());
}
