use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::contour::PitchContour;
use super::extractor::PitchExtractor;

/// Audio we recognize as a reference recording but can't decode.
const UNSUPPORTED_AUDIO: &[&str] = &["mp3", "m4a", "ogg", "flac", "aac"];

/// Reference contours keyed by phrase id.
///
/// Built once at startup and never mutated afterwards, so it can be shared
/// behind an `Arc` by any number of concurrent analyses.
#[derive(Debug, Default)]
pub struct ReferenceLibrary {
    contours: HashMap<String, PitchContour>,
}

impl ReferenceLibrary {
    /// Extract a contour for every `*.wav` in `dir`. The file stem is the
    /// phrase id. A missing directory gives an empty library.
    pub fn load(dir: &Path, extractor: &PitchExtractor, show_progress: bool) -> Result<Self> {
        if !dir.exists() {
            warn!(dir = %dir.display(), "reference directory not found, no phrases can be scored");
            return Ok(Self::default());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read reference directory: {}", dir.display()))?
        {
            let path = entry?.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            match ext.as_deref() {
                Some("wav") => files.push(path),
                Some(e) if UNSUPPORTED_AUDIO.contains(&e) => {
                    warn!(path = %path.display(), "only WAV references are supported, skipping");
                }
                _ => {}
            }
        }
        files.sort();

        let pb = if show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::with_template("  Loading references {bar:30.green/dim} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut library = Self::default();
        for path in &files {
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            pb.set_message(id.to_string());
            let contour = extractor.extract_file(path);
            if contour.is_silent() {
                warn!(phrase = id, "reference has no voiced frames");
            }
            library.insert(id, contour);
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(count = library.len(), dir = %dir.display(), "reference contours loaded");
        Ok(library)
    }

    pub fn insert(&mut self, id: impl Into<String>, contour: PitchContour) {
        self.contours.insert(id.into(), contour);
    }

    pub fn get(&self, id: &str) -> Option<&PitchContour> {
        self.contours.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.contours.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav;
    use crate::config::AnalysisConfig;
    use tempfile::TempDir;

    fn sine(freq: f32, seconds: f32, sr: u32) -> Vec<f32> {
        let n = (seconds * sr as f32) as usize;
        (0..n)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sr as f32).sin())
            .collect()
    }

    #[test]
    fn loads_wav_files_by_stem() {
        let tmp = TempDir::new().unwrap();
        wav::write_samples(&tmp.path().join("YesMale.wav"), &sine(140.0, 0.6, 22050), 22050).unwrap();
        wav::write_samples(&tmp.path().join("BeFemale.wav"), &sine(220.0, 0.6, 22050), 22050).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "not audio").unwrap();
        std::fs::write(tmp.path().join("HelloMale.mp3"), [0u8; 16]).unwrap();

        let extractor = PitchExtractor::new(&AnalysisConfig::default());
        let library = ReferenceLibrary::load(tmp.path(), &extractor, false).unwrap();

        assert_eq!(library.len(), 2);
        assert!(library.contains("YesMale"));
        assert!(library.contains("BeFemale"));
        assert!(!library.contains("HelloMale"));
        assert!(!library.get("YesMale").unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let extractor = PitchExtractor::new(&AnalysisConfig::default());
        let library = ReferenceLibrary::load(&tmp.path().join("nope"), &extractor, false).unwrap();
        assert!(library.is_empty());
    }

    #[test]
    fn undecodable_wav_gets_fallback() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("IMale.wav"), b"RIFF garbage").unwrap();

        let config = AnalysisConfig::default();
        let extractor = PitchExtractor::new(&config);
        let library = ReferenceLibrary::load(tmp.path(), &extractor, false).unwrap();

        let contour = library.get("IMale").unwrap();
        assert!(contour.is_silent());
        assert_eq!(contour.len(), config.fallback_frames);
    }
}
