use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::align::{self, SequenceAligner};
use crate::analysis::extractor::PitchExtractor;
use crate::analysis::feedback::FeedbackGenerator;
use crate::analysis::references::ReferenceLibrary;
use crate::analysis::regions::{self, Region};
use crate::analysis::score::{ScoreEngine, ScoreResult};
use crate::analysis::validation::{self, TextCheck};
use crate::config::{AppConfig, TranscriptionConfig};
use crate::phrases::PhraseBook;
use crate::render::Renderer;
use crate::storage::progress::{ProgressState, ProgressTracker};
use crate::transcribe::Transcriber;

/// Everything the learner gets back for one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub phrase_id: String,
    #[serde(flatten)]
    pub score: ScoreResult,
    /// Normalized transcript, when a recognizer was consulted.
    pub heard_text: Option<String>,
    pub text_check: TextCheck,
    pub regions: Vec<Region>,
    pub alignment_distance: f32,
    pub path_length: usize,
    pub processing_ms: u64,
    /// Progress after this attempt was recorded.
    pub progress: Option<ProgressState>,
    #[serde(skip)]
    pub graph_png: Option<Vec<u8>>,
}

/// Result of an analysis request. An unknown phrase is data, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Scored(Box<AnalysisReport>),
    ReferenceNotFound { phrase_id: String },
}

/// Scores recordings against the cached reference for a phrase.
///
/// All shared state is read-only except the progress tracker, which
/// serializes its own updates, so one `Coach` behind an `Arc` can serve
/// any number of concurrent analyses.
pub struct Coach {
    phrases: PhraseBook,
    references: Arc<ReferenceLibrary>,
    extractor: PitchExtractor,
    aligner: SequenceAligner,
    scorer: ScoreEngine,
    feedback: FeedbackGenerator,
    transcription: TranscriptionConfig,
    fuzzy_threshold: f32,
    transcriber: Option<Box<dyn Transcriber>>,
    renderer: Option<Box<dyn Renderer>>,
    progress: Option<ProgressTracker>,
}

impl Coach {
    pub fn new(config: &AppConfig, phrases: PhraseBook, references: Arc<ReferenceLibrary>) -> Self {
        Self {
            phrases,
            references,
            extractor: PitchExtractor::new(&config.analysis),
            aligner: SequenceAligner::new(config.scoring.dtw_radius),
            scorer: ScoreEngine::new(&config.scoring),
            feedback: FeedbackGenerator::new(&config.scoring),
            transcription: config.transcription.clone(),
            fuzzy_threshold: config.scoring.fuzzy_threshold,
            transcriber: None,
            renderer: None,
            progress: None,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_progress(mut self, tracker: ProgressTracker) -> Self {
        self.progress = Some(tracker);
        self
    }

    /// Analyze uploaded audio bytes.
    ///
    /// The upload is written to a temp file that is removed when the
    /// analysis finishes, fails or panics. The pipeline itself runs on the
    /// blocking pool.
    pub async fn analyze_upload(self: &Arc<Self>, audio: Vec<u8>, phrase_id: String) -> Result<AnalysisOutcome> {
        let mut upload = tempfile::Builder::new()
            .prefix("pitchcoach-upload-")
            .suffix(".wav")
            .tempfile()
            .context("Failed to create temp file for upload")?;
        upload
            .write_all(&audio)
            .and_then(|_| upload.flush())
            .context("Failed to write upload to temp file")?;

        let coach = Arc::clone(self);
        tokio::task::spawn_blocking(move || coach.analyze_path(&phrase_id, upload.path()))
            .await
            .context("Analysis worker panicked")
    }

    /// Run the full pipeline on a recording.
    ///
    /// Audio and estimator problems degrade to the fallback contour; the
    /// only non-scored outcome is an unknown phrase.
    pub fn analyze_path(&self, phrase_id: &str, audio: &Path) -> AnalysisOutcome {
        let started = Instant::now();

        let Some(reference) = self.references.get(phrase_id) else {
            warn!(phrase = phrase_id, "no reference recording for phrase");
            return AnalysisOutcome::ReferenceNotFound {
                phrase_id: phrase_id.to_string(),
            };
        };

        let (heard_text, text_check) = self.check_text(phrase_id, audio);

        let user = self.extractor.extract_file(audio);
        let alignment = self.aligner.align(reference, &user, align::absolute_difference);
        debug!(
            reference_frames = reference.len(),
            user_frames = user.len(),
            path = alignment.path.len(),
            distance = alignment.distance,
            "aligned"
        );

        let labels = self.phrases.syllables(phrase_id).unwrap_or_default();
        let regions = regions::segment(&alignment.path, labels);
        let reference_aligned = alignment.reference_series(reference.values());
        let user_aligned = alignment.user_series(user.values());

        let detail = (!regions.is_empty())
            .then(|| self.feedback.feedback(&reference_aligned, &user_aligned, &regions));
        let score = self
            .scorer
            .score(alignment.distance, alignment.path.len(), text_check.matched)
            .with_detail(detail);

        let graph_png = self.render_graph(phrase_id, &reference_aligned, &user_aligned, &regions);
        let progress = self.record_progress(phrase_id, score.final_score);

        let processing_ms = started.elapsed().as_millis() as u64;
        info!(
            phrase = phrase_id,
            score = score.final_score,
            text_matched = score.text_matched,
            ms = processing_ms,
            "analysis complete"
        );

        AnalysisOutcome::Scored(Box::new(AnalysisReport {
            phrase_id: phrase_id.to_string(),
            score,
            heard_text,
            text_check,
            regions,
            alignment_distance: alignment.distance,
            path_length: alignment.path.len(),
            processing_ms,
            progress,
            graph_png,
        }))
    }

    /// Ask the recognizer what was said and compare it to the phrase.
    ///
    /// Without a recognizer, without accepted texts, or when recognition
    /// fails, the attempt is not penalized.
    fn check_text(&self, phrase_id: &str, audio: &Path) -> (Option<String>, TextCheck) {
        let Some(transcriber) = &self.transcriber else {
            return (None, TextCheck::unvalidated());
        };

        let cfg = &self.transcription;
        let transcription = match transcriber.transcribe(audio, &cfg.language) {
            Ok(t) => t,
            Err(e) => {
                warn!(phrase = phrase_id, error = %e, "transcription failed, skipping text check");
                return (None, TextCheck::unvalidated());
            }
        };

        let heard = validation::normalize_transcript(
            transcription.heard_text(cfg.no_speech_threshold),
            cfg.max_chars,
            cfg.truncate_to,
        );
        debug!(
            phrase = phrase_id,
            heard = %heard,
            no_speech_prob = transcription.no_speech_prob,
            avg_logprob = transcription.avg_logprob,
            "transcribed"
        );

        let check = match self.phrases.accepted_text(phrase_id) {
            Some(accepted) => validation::validate(&heard, accepted, self.fuzzy_threshold),
            None => TextCheck::unvalidated(),
        };
        (Some(heard), check)
    }

    fn render_graph(
        &self,
        phrase_id: &str,
        reference_aligned: &[f32],
        user_aligned: &[f32],
        regions: &[Region],
    ) -> Option<Vec<u8>> {
        let renderer = self.renderer.as_ref()?;
        let title = format!("Pronunciation: {phrase_id}");
        match renderer.render(reference_aligned, user_aligned, regions, &title) {
            Ok(png) => Some(png),
            Err(e) => {
                warn!(phrase = phrase_id, error = %e, "graph rendering failed");
                None
            }
        }
    }

    fn record_progress(&self, phrase_id: &str, score: u32) -> Option<ProgressState> {
        let tracker = self.progress.as_ref()?;
        let today = chrono::Local::now().date_naive();
        match tracker.record(today, phrase_id, score) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(phrase = phrase_id, error = %e, "could not save progress");
                None
            }
        }
    }
}
