//! Authoritative tier: random rows of a labeled A-Z dataset.
//!
//! The dataset is a headerless CSV with one sample per row: an integer
//! class (A=0 .. Z=25) followed by 784 pixel intensities in row-major 28x28
//! order. The file is streamed once per request and one row per requested
//! letter is chosen uniformly with reservoir sampling, so the whole dataset
//! (hundreds of megabytes for the public A-Z set) never sits in memory.

use super::fonts::{FontLibrary, render_centered};
use super::{LabeledSample, SampleSet, SampleTier, SampleTierKind};
use crate::core::constants::{MODEL_INPUT_LEN, MODEL_INPUT_SIZE};
use crate::core::errors::{HcrError, HcrResult};
use crate::domain::index_for_letter;
use image::GrayImage;
use rand::{Rng, RngCore};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name the dataset tier looks for when no path is configured.
pub const DEFAULT_DATASET_FILE: &str = "A_Z Handwritten Data.csv";

#[derive(Debug, Clone)]
pub struct DatasetTier {
    path: PathBuf,
    fonts: FontLibrary,
    fallback_font_size: u32,
}

impl DatasetTier {
    /// Creates a tier reading `path`; letters with no rows are rendered
    /// centered with `fonts` at `fallback_font_size`.
    pub fn new(path: impl Into<PathBuf>, fonts: FontLibrary, fallback_font_size: u32) -> Self {
        Self {
            path: path.into(),
            fonts,
            fallback_font_size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scans the dataset and picks one random row for each letter.
    ///
    /// The result is parallel to `letters`; `None` marks a letter with no
    /// matching rows. Malformed rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns `HcrError::Dataset` if the file cannot be opened or read.
    pub fn scan(
        &self,
        letters: &[char],
        rng: &mut dyn RngCore,
    ) -> HcrResult<Vec<Option<GrayImage>>> {
        let file = File::open(&self.path)
            .map_err(|e| HcrError::dataset(&self.path, format!("cannot open: {e}")))?;
        let reader = BufReader::new(file);

        let classes: Vec<Option<usize>> = letters.iter().map(|&c| index_for_letter(c)).collect();
        let mut seen = vec![0u64; letters.len()];
        let mut chosen: Vec<Option<Vec<u8>>> = vec![None; letters.len()];
        let mut skipped = 0usize;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                HcrError::dataset(&self.path, format!("read failed at line {}: {e}", line_no + 1))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let Some((class, pixels)) = parse_row(&line) else {
                skipped += 1;
                continue;
            };

            for (slot, wanted) in classes.iter().enumerate() {
                if *wanted != Some(class) {
                    continue;
                }
                seen[slot] += 1;
                // keep the k-th match with probability 1/k
                if rng.random_range(0..seen[slot]) == 0 {
                    chosen[slot] = Some(pixels.clone());
                }
            }
        }

        if skipped > 0 {
            debug!("Skipped {} malformed rows in {}", skipped, self.path.display());
        }

        Ok(chosen
            .into_iter()
            .map(|pixels| {
                pixels.and_then(|p| GrayImage::from_raw(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, p))
            })
            .collect())
    }
}

impl SampleTier for DatasetTier {
    fn kind(&self) -> SampleTierKind {
        SampleTierKind::Dataset
    }

    fn try_load(&self, letters: &[char], rng: &mut dyn RngCore) -> Option<SampleSet> {
        let picked = match self.scan(letters, rng) {
            Ok(picked) => picked,
            Err(e) => {
                warn!("Could not load A-Z dataset: {}", e);
                return None;
            }
        };

        let samples = letters
            .iter()
            .zip(picked)
            .map(|(&letter, image)| {
                let image = image.unwrap_or_else(|| {
                    debug!("No dataset rows for '{}', rendering it instead", letter);
                    render_centered(self.fonts.primary(), letter, self.fallback_font_size)
                });
                LabeledSample::new(letter, image)
            })
            .collect();
        Some(SampleSet::new(SampleTierKind::Dataset, samples))
    }
}

/// Parses `label,p0,...,p783`. Pixel values may be written as integers or
/// floats and are clamped to 0-255.
fn parse_row(line: &str) -> Option<(usize, Vec<u8>)> {
    let mut fields = line.split(',').map(str::trim);
    let label: f64 = fields.next()?.parse().ok()?;
    if label < 0.0 || label.fract() != 0.0 {
        return None;
    }

    let mut pixels = Vec::with_capacity(MODEL_INPUT_LEN);
    for field in fields {
        let value = match field.parse::<u8>() {
            Ok(v) => v,
            Err(_) => field.parse::<f64>().ok()?.round().clamp(0.0, 255.0) as u8,
        };
        pixels.push(value);
    }
    (pixels.len() == MODEL_INPUT_LEN).then_some((label as usize, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn row(class: usize, value: u8) -> String {
        let mut fields = vec![class.to_string()];
        fields.extend(std::iter::repeat_n(value.to_string(), MODEL_INPUT_LEN));
        fields.join(",")
    }

    fn dataset(rows: &[String]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for r in rows {
            writeln!(file, "{r}").unwrap();
        }
        file
    }

    #[test]
    fn test_parse_row() {
        let (class, pixels) = parse_row(&row(3, 200)).unwrap();
        assert_eq!(class, 3);
        assert_eq!(pixels.len(), MODEL_INPUT_LEN);
        assert!(parse_row("1,2,3").is_none());
        assert!(parse_row("label,0").is_none());
    }

    #[test]
    fn test_parse_row_accepts_float_pixels() {
        let mut fields = vec!["0.0".to_string()];
        fields.extend(std::iter::repeat_n("12.6".to_string(), MODEL_INPUT_LEN));
        let (class, pixels) = parse_row(&fields.join(",")).unwrap();
        assert_eq!(class, 0);
        assert!(pixels.iter().all(|&p| p == 13));
    }

    #[test]
    fn test_picks_matching_rows() {
        let file = dataset(&[row(0, 10), row(1, 20), row(0, 10), row(4, 50)]);
        let tier = DatasetTier::new(file.path(), FontLibrary::empty(), 18);
        let mut rng = StdRng::seed_from_u64(3);

        let set = tier.try_load(&['A', 'B', 'E'], &mut rng).unwrap();
        assert_eq!(set.labels(), vec!['A', 'B', 'E']);
        assert!(set.get('A').unwrap().pixels().all(|p| p[0] == 10));
        assert!(set.get('B').unwrap().pixels().all(|p| p[0] == 20));
        assert!(set.get('E').unwrap().pixels().all(|p| p[0] == 50));
    }

    #[test]
    fn test_letter_without_rows_is_rendered() {
        let file = dataset(&[row(0, 10)]);
        let tier = DatasetTier::new(file.path(), FontLibrary::empty(), 18);
        let mut rng = StdRng::seed_from_u64(3);

        let set = tier.try_load(&['A', 'C'], &mut rng).unwrap();
        assert_eq!(set.len(), 2);
        let rendered = set.get('C').unwrap();
        assert!(rendered.pixels().any(|p| p[0] == 255));
        assert!(rendered.pixels().any(|p| p[0] == 0));
    }

    #[test]
    fn test_reservoir_reaches_every_row() {
        let file = dataset(&[row(2, 1), row(2, 2), row(2, 3)]);
        let tier = DatasetTier::new(file.path(), FontLibrary::empty(), 18);
        let mut rng = StdRng::seed_from_u64(11);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let picked = tier.scan(&['C'], &mut rng).unwrap();
            seen.insert(picked[0].as_ref().unwrap().get_pixel(0, 0)[0]);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let file = dataset(&["header,row".to_string(), "0,1,2".to_string(), row(0, 7)]);
        let tier = DatasetTier::new(file.path(), FontLibrary::empty(), 18);
        let mut rng = StdRng::seed_from_u64(0);
        let picked = tier.scan(&['A'], &mut rng).unwrap();
        assert_eq!(picked[0].as_ref().unwrap().get_pixel(5, 5)[0], 7);
    }

    #[test]
    fn test_missing_file_declines() {
        let tier = DatasetTier::new("/nonexistent/az.csv", FontLibrary::empty(), 18);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(tier.try_load(&['A'], &mut rng).is_none());
        assert!(matches!(
            tier.scan(&['A'], &mut rng),
            Err(HcrError::Dataset { .. })
        ));
    }
}
