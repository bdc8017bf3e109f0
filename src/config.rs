use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dsp::pitch::PitchConfig;
use crate::paths;

/// Application configuration, loaded from config.toml.
///
/// Every section carries `#[serde(default)]`, so a missing file or a file
/// that only sets a couple of keys still yields a complete config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub scoring: ScoringConfig,
    pub transcription: TranscriptionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// All audio is resampled to this rate before analysis.
    pub sample_rate: u32,
    /// Leading/trailing frames quieter than this many dB below the peak are trimmed.
    pub trim_top_db: f32,
    pub pitch_floor_hz: f32,
    pub pitch_ceiling_hz: f32,
    pub frame_size_ms: f32,
    pub hop_size_ms: f32,
    pub power_threshold: f64,
    pub clarity_threshold: f64,
    /// Savitzky-Golay window length in frames (odd).
    pub smoothing_window: usize,
    pub smoothing_order: usize,
    /// Length of the all-zero contour returned when no pitch is found.
    pub fallback_frames: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score points lost per unit of mean aligned distance.
    pub distance_scale: f32,
    /// Points deducted when the spoken text does not match the phrase.
    pub mismatch_penalty: f32,
    /// Regions narrower than this many path steps get no feedback.
    pub min_region_width: usize,
    /// Allowed mean deviation (normalized pitch units) before flagging a syllable.
    pub pitch_tolerance: f32,
    /// Minimum similarity ratio for a fuzzy transcript match (inclusive).
    pub fuzzy_threshold: f32,
    /// Search radius of the coarse-to-fine alignment.
    pub dtw_radius: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// "openai" or "none".
    pub provider: String,
    pub model: String,
    pub language: String,
    /// Priming text that nudges the recognizer towards the lesson language.
    pub prompt: String,
    /// Transcripts whose mean no-speech probability exceeds this are treated as silence.
    pub no_speech_threshold: f32,
    /// Transcripts longer than this are assumed to be repetition loops...
    pub max_chars: usize,
    /// ...and cut down to this many characters.
    pub truncate_to: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrases_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_file: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            trim_top_db: 20.0,
            pitch_floor_hz: 50.0,
            pitch_ceiling_hz: 400.0,
            frame_size_ms: 46.0,
            hop_size_ms: 23.2,
            power_threshold: 0.2,
            clarity_threshold: 0.5,
            smoothing_window: 21,
            smoothing_order: 2,
            fallback_frames: 100,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            distance_scale: 25.0,
            mismatch_penalty: 50.0,
            min_region_width: 5,
            pitch_tolerance: 0.6,
            fuzzy_threshold: 0.6,
            dtw_radius: 1,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "whisper-1".into(),
            language: "ja".into(),
            prompt: "これは日本語の授業です。".into(),
            no_speech_threshold: 0.6,
            max_chars: 50,
            truncate_to: 20,
        }
    }
}

impl From<&AnalysisConfig> for PitchConfig {
    fn from(cfg: &AnalysisConfig) -> Self {
        PitchConfig {
            pitch_floor_hz: cfg.pitch_floor_hz,
            pitch_ceiling_hz: cfg.pitch_ceiling_hz,
            frame_size_ms: cfg.frame_size_ms,
            hop_size_ms: cfg.hop_size_ms,
            power_threshold: cfg.power_threshold,
            clarity_threshold: cfg.clarity_threshold,
        }
    }
}

impl StorageConfig {
    pub fn references_dir(&self) -> PathBuf {
        self.references_dir
            .clone()
            .unwrap_or_else(paths::references_dir)
    }

    pub fn phrases_file(&self) -> PathBuf {
        self.phrases_file.clone().unwrap_or_else(paths::phrases_file)
    }

    pub fn progress_file(&self) -> PathBuf {
        self.progress_file.clone().unwrap_or_else(paths::progress_file)
    }
}

/// Load the application config from $XDG_CONFIG_HOME/pitchcoach/config.toml.
/// If the file doesn't exist, returns defaults.
pub fn load_config() -> Result<AppConfig> {
    let path = paths::config_file();

    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
