//! Font discovery and single-glyph rendering on the 28x28 canvas.

use super::stroke_font;
use crate::core::config::SampleConfig;
use crate::core::constants::MODEL_INPUT_SIZE;
use crate::core::errors::{HcrError, HcrResult};
use ab_glyph::{FontVec, PxScale};
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_text_mut, text_size};
use rand::RngCore;
use rand::seq::IndexedRandom;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Well-known locations of the sans and serif faces the samples are styled
/// after (Arial, Calibri, Times, Georgia) or their common substitutes.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
    "/System/Library/Fonts/Supplemental/Georgia.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\calibri.ttf",
    "C:\\Windows\\Fonts\\times.ttf",
    "C:\\Windows\\Fonts\\georgia.ttf",
];

/// A parsed TrueType face.
pub struct FontFace {
    name: String,
    font: FontVec,
}

impl FontFace {
    /// Loads and parses a font file.
    pub fn load(path: &Path) -> HcrResult<Self> {
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec(data).map_err(|_| {
            HcrError::invalid_input(format!("failed to parse font file: {}", path.display()))
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, font })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn font(&self) -> &FontVec {
        &self.font
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.name)
            .finish()
    }
}

/// The set of TrueType faces available for sample rendering.
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    faces: Vec<Arc<FontFace>>,
}

impl FontLibrary {
    /// A library with no TrueType faces; rendering uses the stroke font.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the configured font paths, then any system fonts found.
    pub fn discover(config: &SampleConfig) -> Self {
        let mut library = Self::from_paths(&config.font_paths);
        for path in SYSTEM_FONT_PATHS {
            let path = Path::new(path);
            if !path.exists() {
                continue;
            }
            if let Ok(face) = FontFace::load(path) {
                info!("Loaded system font: {}", path.display());
                library.faces.push(Arc::new(face));
            }
        }
        if library.is_empty() {
            debug!("No TrueType font found, glyphs fall back to the stroke font");
        }
        library
    }

    /// Loads the given font files, skipping any that fail to load.
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        let faces = paths
            .iter()
            .filter_map(|path| match FontFace::load(path) {
                Ok(face) => Some(Arc::new(face)),
                Err(e) => {
                    warn!("Skipping font {}: {}", path.display(), e);
                    None
                }
            })
            .collect();
        Self { faces }
    }

    pub fn push(&mut self, face: FontFace) {
        self.faces.push(Arc::new(face));
    }

    pub fn faces(&self) -> &[Arc<FontFace>] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The first face, or the stroke font if there is none.
    pub fn primary(&self) -> Glyphs<'_> {
        self.faces
            .first()
            .map(|face| Glyphs::TrueType(face.as_ref()))
            .unwrap_or(Glyphs::Stroke)
    }

    /// A uniformly chosen face, or the stroke font if there is none.
    pub fn choose(&self, rng: &mut dyn RngCore) -> Glyphs<'_> {
        self.faces
            .choose(rng)
            .map(|face| Glyphs::TrueType(face.as_ref()))
            .unwrap_or(Glyphs::Stroke)
    }
}

/// A glyph source: a TrueType face or the built-in stroke font.
#[derive(Debug, Clone, Copy)]
pub enum Glyphs<'a> {
    TrueType(&'a FontFace),
    Stroke,
}

impl Glyphs<'_> {
    /// Bounding box of `letter` rendered at `size` pixels.
    pub fn measure(&self, letter: char, size: u32) -> (u32, u32) {
        match self {
            Glyphs::TrueType(face) => {
                text_size(PxScale::from(size as f32), face.font(), &letter.to_string())
            }
            Glyphs::Stroke => stroke_font::measure(letter, size),
        }
    }

    /// Draws white `letter` with its box's top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut GrayImage, letter: char, x: i32, y: i32, size: u32) {
        let ink = Luma([255u8]);
        match self {
            Glyphs::TrueType(face) => draw_text_mut(
                canvas,
                ink,
                x,
                y,
                PxScale::from(size as f32),
                face.font(),
                &letter.to_string(),
            ),
            Glyphs::Stroke => stroke_font::draw(canvas, letter, x, y, size, ink),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Glyphs::TrueType(face) => face.name(),
            Glyphs::Stroke => "stroke",
        }
    }
}

/// Renders a white letter on a black 28x28 canvas.
///
/// The glyph box is centered, shifted by `offset`, and then clamped so it
/// starts inside the canvas and does not run past the far edge.
pub fn render_letter(glyphs: Glyphs<'_>, letter: char, size: u32, offset: (i32, i32)) -> GrayImage {
    let side = MODEL_INPUT_SIZE as i32;
    let (w, h) = glyphs.measure(letter, size);
    let (w, h) = (w as i32, h as i32);
    let x = ((side - w).div_euclid(2) + offset.0).min(side - w).max(0);
    let y = ((side - h).div_euclid(2) + offset.1).min(side - h).max(0);

    let mut canvas = GrayImage::new(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE);
    glyphs.draw(&mut canvas, letter, x, y, size);
    canvas
}

/// Renders a centered white letter on a black 28x28 canvas.
pub fn render_centered(glyphs: Glyphs<'_>, letter: char, size: u32) -> GrayImage {
    render_letter(glyphs, letter, size, (0, 0))
}
