//! Constant tier: fixed hand-drawn bitmaps, font rendering for the rest.
//!
//! Fully deterministic and always available.

use super::fonts::{FontLibrary, render_centered};
use super::{LabeledSample, SampleSet, SampleTier, SampleTierKind};
use crate::core::constants::MODEL_INPUT_SIZE;
use image::{GrayImage, Luma};
use rand::RngCore;

const BITMAP_B: [&str; 28] = [
    "............................",
    "............................",
    "............................",
    "....###############.........",
    "....################........",
    "....##............##........",
    "....##............##........",
    "....##............##........",
    "....###############.........",
    "....################........",
    "....##............##........",
    "....##............##........",
    "....##............##........",
    "....################........",
    "....################........",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
];

const BITMAP_M: [&str; 28] = [
    "............................",
    "............................",
    "...##................##.....",
    "...###..............###.....",
    "...####............####.....",
    "...#####..........#####.....",
    "...##.###........###.##.....",
    "...##..###......###..##.....",
    "...##...###....###...##.....",
    "...##....###..###....##.....",
    "...##.....######.....##.....",
    "...##......####......##.....",
    "...##.......##.......##.....",
    "...##................##.....",
    "...##................##.....",
    "...##................##.....",
    "...##................##.....",
    "...##................##.....",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
    "............................",
];

/// The hand-drawn bitmap for a letter, if one exists.
pub fn bitmap(letter: char) -> Option<GrayImage> {
    let rows = match letter.to_ascii_uppercase() {
        'B' => &BITMAP_B,
        'M' => &BITMAP_M,
        _ => return None,
    };
    let mut image = GrayImage::new(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE);
    for (y, row) in rows.iter().enumerate() {
        for (x, cell) in row.bytes().enumerate() {
            if cell == b'#' {
                image.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
    }
    Some(image)
}

#[derive(Debug, Clone)]
pub struct ConstantTier {
    fonts: FontLibrary,
    font_size: u32,
}

impl ConstantTier {
    pub fn new(fonts: FontLibrary, font_size: u32) -> Self {
        Self { fonts, font_size }
    }

    /// Bitmaps where available, centered renderings otherwise.
    pub fn load(&self, letters: &[char]) -> SampleSet {
        let samples = letters
            .iter()
            .map(|&letter| {
                let image = bitmap(letter).unwrap_or_else(|| {
                    render_centered(self.fonts.primary(), letter, self.font_size)
                });
                LabeledSample::new(letter, image)
            })
            .collect();
        SampleSet::new(SampleTierKind::Constant, samples)
    }
}

impl SampleTier for ConstantTier {
    fn kind(&self) -> SampleTierKind {
        SampleTierKind::Constant
    }

    fn try_load(&self, letters: &[char], _rng: &mut dyn RngCore) -> Option<SampleSet> {
        Some(self.load(letters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmaps_are_28_wide() {
        for rows in [&BITMAP_B, &BITMAP_M] {
            assert!(rows.iter().all(|r| r.len() == 28));
        }
    }

    #[test]
    fn test_b_bitmap_pixels() {
        let b = bitmap('B').unwrap();
        assert_eq!(b.get_pixel(4, 3)[0], 255);
        assert_eq!(b.get_pixel(18, 3)[0], 255);
        assert_eq!(b.get_pixel(19, 3)[0], 0);
        assert_eq!(b.get_pixel(19, 4)[0], 255);
        assert_eq!(b.get_pixel(10, 6)[0], 0);
        assert_eq!(b.get_pixel(4, 15)[0], 0);
    }

    #[test]
    fn test_m_bitmap_is_symmetric_stroke() {
        let m = bitmap('m').unwrap();
        assert_eq!(m.get_pixel(12, 12)[0], 255);
        assert_eq!(m.get_pixel(13, 12)[0], 255);
        assert_eq!(m.get_pixel(3, 17)[0], 255);
        assert_eq!(m.get_pixel(3, 18)[0], 0);
    }

    #[test]
    fn test_load_is_deterministic() {
        let tier = ConstantTier::new(FontLibrary::empty(), 18);
        let letters = ['B', 'A', 'M', 'T'];
        let first = tier.load(&letters);
        let second = tier.load(&letters);
        assert_eq!(first, second);
        assert_eq!(first.labels(), letters.to_vec());
        assert_eq!(first.get('B'), bitmap('B').as_ref());
    }
}
