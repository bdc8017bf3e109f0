mod whisper;

use std::path::Path;

use anyhow::Result;

use crate::config::TranscriptionConfig;

pub use whisper::WhisperApiTranscriber;

/// What a speech recognizer heard in a recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcription {
    pub text: String,
    /// Mean probability, over segments, that the audio contains no speech.
    pub no_speech_prob: f32,
    pub avg_logprob: f32,
}

impl Transcription {
    /// The recognized text, or empty if the recognizer thinks nobody spoke.
    ///
    /// Recognizers hallucinate plausible sentences out of silence, so a
    /// high no-speech probability discards the text.
    pub fn heard_text(&self, no_speech_threshold: f32) -> &str {
        if self.no_speech_prob > no_speech_threshold {
            ""
        } else {
            &self.text
        }
    }
}

/// Speech recognizer used to check that the learner said the right words.
///
/// Calls block; they are made from the analysis worker, never from the
/// async event loop.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio: &Path, language: &str) -> Result<Transcription>;
}

/// Build the configured transcriber. `provider = "none"` disables validation.
pub fn from_config(config: &TranscriptionConfig) -> Result<Option<Box<dyn Transcriber>>> {
    match config.provider.to_lowercase().as_str() {
        "none" | "off" | "" => Ok(None),
        "openai" | "whisper" => Ok(Some(Box::new(WhisperApiTranscriber::from_env(config)?))),
        other => anyhow::bail!("Unknown transcription provider: {other}. Use 'openai' or 'none'."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confident_speech_is_kept() {
        let t = Transcription {
            text: "hai".into(),
            no_speech_prob: 0.1,
            avg_logprob: -0.3,
        };
        assert_eq!(t.heard_text(0.6), "hai");
    }

    #[test]
    fn likely_silence_is_discarded() {
        let t = Transcription {
            text: "ご視聴ありがとうございました".into(),
            no_speech_prob: 0.9,
            avg_logprob: -1.2,
        };
        assert_eq!(t.heard_text(0.6), "");
    }

    #[test]
    fn provider_none_disables() {
        let config = TranscriptionConfig {
            provider: "none".into(),
            ..TranscriptionConfig::default()
        };
        assert!(from_config(&config).unwrap().is_none());
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let config = TranscriptionConfig {
            provider: "parrot".into(),
            ..TranscriptionConfig::default()
        };
        assert!(from_config(&config).is_err());
    }
}
