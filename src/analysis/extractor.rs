use std::path::Path;

use tracing::{debug, warn};

use super::contour::{self, PitchContour};
use crate::audio::{resample, wav};
use crate::config::AnalysisConfig;
use crate::dsp::pitch::{self, PitchConfig};
use crate::dsp::{smoothing, trim};

/// Turns recordings into normalized pitch contours.
///
/// Extraction never fails from the caller's point of view: decode errors,
/// recordings with no voiced frames and estimator trouble all produce the
/// all-zero fallback contour of `fallback_frames` frames.
#[derive(Debug, Clone)]
pub struct PitchExtractor {
    config: AnalysisConfig,
    pitch: PitchConfig,
}

impl PitchExtractor {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
            pitch: config.into(),
        }
    }

    /// The contour returned whenever no usable pitch signal exists.
    pub fn fallback(&self) -> PitchContour {
        PitchContour::fallback(self.config.fallback_frames)
    }

    /// Load a WAV file and extract its contour. Unreadable files give the fallback.
    pub fn extract_file(&self, path: &Path) -> PitchContour {
        match wav::load_samples(path) {
            Ok((samples, spec)) => self.extract(&samples, spec.sample_rate),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not decode audio, using fallback contour");
                self.fallback()
            }
        }
    }

    /// Extract a normalized, smoothed pitch contour from mono samples.
    pub fn extract(&self, samples: &[f32], sample_rate: u32) -> PitchContour {
        let target_rate = self.config.sample_rate;
        let resampled = match resample::linear_resample(samples, sample_rate, target_rate) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "resampling failed, using fallback contour");
                return self.fallback();
            }
        };

        let trimmed = trim::trim_silence(&resampled, self.config.trim_top_db);
        let frames = pitch::extract_pitch_contour(trimmed, target_rate, &self.pitch);
        debug!(
            samples = trimmed.len(),
            frames = frames.len(),
            voiced = pitch::voiced_fraction(&frames),
            "pitch tracked"
        );

        let frequencies: Vec<f32> = frames
            .iter()
            .map(|f| f.frequency.unwrap_or(0.0))
            .collect();

        let Some(normalized) = contour::normalize(&frequencies) else {
            debug!("no voiced frames, using fallback contour");
            return self.fallback();
        };

        let values = smoothing::savgol(
            &normalized,
            self.config.smoothing_window,
            self.config.smoothing_order,
        )
        .unwrap_or(normalized);

        if values.iter().any(|v| !v.is_finite()) {
            warn!("non-finite pitch values, using fallback contour");
            return self.fallback();
        }

        PitchContour::new(values)
    }
}
