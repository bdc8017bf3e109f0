use std::path::Path;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{Transcriber, Transcription};
use crate::config::TranscriptionConfig;

const API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// `verbose_json` response from the transcription endpoint.
#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
struct Segment {
    #[serde(default)]
    no_speech_prob: f32,
    #[serde(default)]
    avg_logprob: f32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// OpenAI Whisper transcription over HTTP.
pub struct WhisperApiTranscriber {
    api_key: String,
    model: String,
    prompt: String,
}

impl WhisperApiTranscriber {
    pub fn new(api_key: impl Into<String>, config: &TranscriptionConfig) -> Self {
        Self {
            api_key: api_key.into(),
            model: config.model.clone(),
            prompt: config.prompt.clone(),
        }
    }

    /// Read the API key from the environment.
    pub fn from_env(config: &TranscriptionConfig) -> Result<Self> {
        let key = std::env::var(API_KEY_ENV).with_context(|| {
            format!(
                "{API_KEY_ENV} not set. Export it in your shell:\n  export {API_KEY_ENV}=sk-...\n\
                 or set transcription.provider = \"none\" in config.toml"
            )
        })?;
        Ok(Self::new(key, config))
    }

    /// Async implementation, used directly when we already have a runtime.
    pub async fn transcribe_async(&self, audio: &Path, language: &str) -> Result<Transcription> {
        let bytes = std::fs::read(audio)
            .with_context(|| format!("Failed to read audio: {}", audio.display()))?;
        let file_name = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let file = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")
            .context("Invalid audio MIME type")?;

        // Greedy decoding, no sampling.
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", language.to_string())
            .text("prompt", self.prompt.clone())
            .text("temperature", "0")
            .text("response_format", "verbose_json");

        let client = reqwest::Client::new();
        let response = client
            .post(API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .context("Failed to send request to OpenAI transcription API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read OpenAI transcription response")?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
                anyhow::bail!("OpenAI API error ({}): {}", status, err.error.message);
            }
            anyhow::bail!("OpenAI API error ({}): {}", status, body);
        }

        parse_response(&body)
    }
}

impl Transcriber for WhisperApiTranscriber {
    fn transcribe(&self, audio: &Path, language: &str) -> Result<Transcription> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create async runtime")?;

        rt.block_on(self.transcribe_async(audio, language))
    }
}

fn parse_response(body: &str) -> Result<Transcription> {
    let parsed: Response =
        serde_json::from_str(body).context("Failed to parse OpenAI transcription response")?;

    let (no_speech_prob, avg_logprob) = if parsed.segments.is_empty() {
        (0.0, 0.0)
    } else {
        let n = parsed.segments.len() as f32;
        (
            parsed.segments.iter().map(|s| s.no_speech_prob).sum::<f32>() / n,
            parsed.segments.iter().map(|s| s.avg_logprob).sum::<f32>() / n,
        )
    };

    Ok(Transcription {
        text: parsed.text.trim().to_string(),
        no_speech_prob,
        avg_logprob,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_verbose_json() {
        let body = r#"{
            "text": " はい、です。 ",
            "segments": [
                {"no_speech_prob": 0.2, "avg_logprob": -0.5},
                {"no_speech_prob": 0.4, "avg_logprob": -0.3}
            ]
        }"#;
        let t = parse_response(body).unwrap();
        assert_eq!(t.text, "はい、です。");
        assert!((t.no_speech_prob - 0.3).abs() < 1e-6);
        assert!((t.avg_logprob + 0.4).abs() < 1e-6);
    }

    #[test]
    fn missing_segments_mean_speech() {
        let t = parse_response(r#"{"text": "hai"}"#).unwrap();
        assert_eq!(t.no_speech_prob, 0.0);
    }

    #[test]
    fn garbage_body_is_an_error() {
        assert!(parse_response("<html>").is_err());
    }
}
