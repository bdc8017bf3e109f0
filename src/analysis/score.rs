use serde::Serialize;

use crate::config::ScoringConfig;

pub const MSG_VALIDATED: &str = "Great pronunciation!";
pub const MSG_CONTENT_MISMATCH: &str = "Pitch analysis complete. (Pronunciation did not match)";
pub const MSG_NO_ALIGNMENT: &str = "No alignment possible: the recording could not be compared.";

/// Score for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Pitch similarity before any content penalty, 0-100.
    pub raw_score: f32,
    pub text_matched: bool,
    /// What the learner sees, 0-100.
    pub final_score: u32,
    pub feedback_message: String,
    /// False when the contours could not be aligned at all.
    #[serde(skip)]
    pub aligned: bool,
}

impl ScoreResult {
    /// Replace the generic message with per-syllable detail.
    ///
    /// Only applies to an aligned attempt whose content matched; the
    /// mismatch and no-alignment messages take priority over pitch detail.
    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        match detail {
            Some(detail) if !detail.is_empty() && self.text_matched && self.aligned => {
                self.feedback_message = detail;
            }
            _ => {}
        }
        self
    }
}

/// Turns alignment distance into a 0-100 score.
#[derive(Debug, Clone)]
pub struct ScoreEngine {
    distance_scale: f32,
    mismatch_penalty: f32,
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl ScoreEngine {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            distance_scale: config.distance_scale,
            mismatch_penalty: config.mismatch_penalty,
        }
    }

    /// raw = max(0, 100 - mean_step_distance * scale), minus the mismatch
    /// penalty (floored at 0) when the spoken text did not match.
    ///
    /// An empty path scores 0 with a "no alignment" message.
    pub fn score(&self, distance: f32, path_len: usize, text_matched: bool) -> ScoreResult {
        if path_len == 0 || !distance.is_finite() {
            return ScoreResult {
                raw_score: 0.0,
                text_matched,
                final_score: 0,
                feedback_message: MSG_NO_ALIGNMENT.into(),
                aligned: false,
            };
        }

        let mean_distance = distance.max(0.0) / path_len as f32;
        let raw_score = (100.0 - mean_distance * self.distance_scale).clamp(0.0, 100.0);

        let (final_score, feedback_message) = if text_matched {
            (raw_score, MSG_VALIDATED)
        } else {
            ((raw_score - self.mismatch_penalty).max(0.0), MSG_CONTENT_MISMATCH)
        };

        ScoreResult {
            raw_score,
            text_matched,
            final_score: final_score as u32,
            feedback_message: feedback_message.into(),
            aligned: true,
        }
    }
}
