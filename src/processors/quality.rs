//! Advisory image quality assessment.
//!
//! Four independent checks worth 25 points each: contrast, exposure, local
//! noise and resolution. A check either awards its points in full or emits
//! an issue/recommendation pair. The noise check is only evaluated when
//! both dimensions exceed the configured minimum; on smaller images it
//! neither awards nor withholds points, so their maximum score is 75.
//!
//! The report never blocks preprocessing or inference.

use crate::core::config::QualityConfig;
use crate::core::constants::QUALITY_CHECK_POINTS;
use crate::domain::Mode;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Issue tags emitted by the quality checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityIssue {
    LowContrast,
    TooDark,
    TooBright,
    HighNoise,
    LowResolution,
}

impl QualityIssue {
    /// The issue tag shown to users.
    pub fn description(self) -> &'static str {
        match self {
            QualityIssue::LowContrast => "Low contrast",
            QualityIssue::TooDark => "Image too dark",
            QualityIssue::TooBright => "Image too bright",
            QualityIssue::HighNoise => "High noise level",
            QualityIssue::LowResolution => "Image resolution too low",
        }
    }

    /// The remediation paired with the issue.
    pub fn recommendation(self) -> &'static str {
        match self {
            QualityIssue::LowContrast => "Increase contrast between character and background",
            QualityIssue::TooDark => "Improve lighting conditions",
            QualityIssue::TooBright => "Reduce lighting or exposure",
            QualityIssue::HighNoise => "Use cleaner image or better lighting",
            QualityIssue::LowResolution => {
                "Use higher resolution image (at least 100x100 pixels)"
            }
        }
    }
}

impl std::fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Coarse grading of a quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityBand {
    /// Score of 75 or more.
    Good,
    /// Score of 50 to 74.
    Fair,
    /// Score below 50.
    Poor,
}

/// Result of [`QualityAssessor::assess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Sum of awarded sub-check points, 0 to 100.
    pub score: u8,
    /// Issues in check order.
    pub issues: Vec<QualityIssue>,
    /// Recommendations, parallel to `issues`.
    pub recommendations: Vec<String>,
    /// Whether the noise check ran (false for small images).
    pub noise_checked: bool,
}

impl QualityReport {
    fn empty() -> Self {
        Self {
            score: 0,
            issues: Vec::new(),
            recommendations: Vec::new(),
            noise_checked: false,
        }
    }

    fn pass(&mut self) {
        self.score += QUALITY_CHECK_POINTS;
    }

    fn fail(&mut self, issue: QualityIssue) {
        self.issues.push(issue);
        self.recommendations
            .push(issue.recommendation().to_string());
    }

    pub fn band(&self) -> QualityBand {
        match self.score {
            75.. => QualityBand::Good,
            50..=74 => QualityBand::Fair,
            _ => QualityBand::Poor,
        }
    }

    /// Returns `true` when the score is at least fair.
    pub fn is_acceptable(&self) -> bool {
        self.score >= 50
    }

    /// Issue tags as display strings.
    pub fn issue_descriptions(&self) -> Vec<&'static str> {
        self.issues.iter().map(|i| i.description()).collect()
    }
}

/// Scores grayscale images for likely recognition failure modes.
#[derive(Debug, Clone, Default)]
pub struct QualityAssessor {
    config: QualityConfig,
}

impl QualityAssessor {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Scores a grayscale image.
    ///
    /// The mode is accepted for symmetry with the rest of the pipeline; both
    /// modes currently share the same thresholds.
    pub fn assess(&self, image: &GrayImage, mode: Mode) -> QualityReport {
        let cfg = &self.config;
        let mut report = QualityReport::empty();
        let (width, height) = image.dimensions();
        let (mean, std) = mean_std(image.as_raw().iter().copied());

        if std < cfg.min_contrast_std {
            report.fail(QualityIssue::LowContrast);
        } else {
            report.pass();
        }

        if mean < cfg.dark_mean {
            report.fail(QualityIssue::TooDark);
        } else if mean > cfg.bright_mean {
            report.fail(QualityIssue::TooBright);
        } else {
            report.pass();
        }

        if width > cfg.noise_check_min_dim && height > cfg.noise_check_min_dim {
            report.noise_checked = true;
            let noise = region_std(image, cfg.noise_region_start, cfg.noise_region_end);
            if noise > cfg.max_noise_std {
                report.fail(QualityIssue::HighNoise);
            } else {
                report.pass();
            }
        }

        if width.min(height) < cfg.min_resolution {
            report.fail(QualityIssue::LowResolution);
        } else {
            report.pass();
        }

        debug!(
            "Quality ({}): {}x{} mean={:.1} std={:.1} score={} issues={:?}",
            mode, width, height, mean, std, report.score, report.issues
        );
        report
    }
}

/// Population mean and standard deviation of a sample stream.
fn mean_std(values: impl Iterator<Item = u8>) -> (f64, f64) {
    let mut count = 0usize;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for v in values {
        let v = v as f64;
        count += 1;
        sum += v;
        sum_sq += v * v;
    }
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
    (mean, variance.sqrt())
}

/// Standard deviation of the square region `[start, end)` on both axes,
/// clipped to the image.
fn region_std(image: &GrayImage, start: u32, end: u32) -> f64 {
    let (width, height) = image.dimensions();
    let x_end = end.min(width);
    let y_end = end.min(height);
    let pixels = (start..y_end)
        .flat_map(|y| (start..x_end).map(move |x| (x, y)))
        .map(|(x, y)| image.get_pixel(x, y)[0]);
    mean_std(pixels).1
}
