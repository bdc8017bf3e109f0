use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Most recent scores kept in history.
pub const HISTORY_LIMIT: usize = 50;

/// One scored attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub date: NaiveDate,
    pub phrase_id: String,
    pub score: u32,
}

/// The learner's practice record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressState {
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_sessions: u32,
    pub last_practice_date: Option<NaiveDate>,
    /// Oldest first, at most [`HISTORY_LIMIT`] entries.
    pub score_history: Vec<ScoreEntry>,
}

impl ProgressState {
    /// Record a scored attempt made on `today`.
    ///
    /// Streak: +1 if the last practice was yesterday, unchanged if already
    /// practiced today, otherwise restarts at 1.
    pub fn record(&mut self, today: NaiveDate, phrase_id: &str, score: u32) {
        self.current_streak = match self.last_practice_date {
            Some(last) if last == today => self.current_streak.max(1),
            Some(last) if today.pred_opt() == Some(last) => self.current_streak + 1,
            _ => 1,
        };
        self.best_streak = self.best_streak.max(self.current_streak);
        self.last_practice_date = Some(today);
        self.total_sessions += 1;

        self.score_history.push(ScoreEntry {
            date: today,
            phrase_id: phrase_id.to_string(),
            score,
        });
        if self.score_history.len() > HISTORY_LIMIT {
            let excess = self.score_history.len() - HISTORY_LIMIT;
            self.score_history.drain(..excess);
        }
    }

    /// Mean of the scores in history, None if there are none.
    pub fn average_score(&self) -> Option<f32> {
        if self.score_history.is_empty() {
            return None;
        }
        let sum: u32 = self.score_history.iter().map(|e| e.score).sum();
        Some(sum as f32 / self.score_history.len() as f32)
    }

    pub fn recent(&self, n: usize) -> &[ScoreEntry] {
        let start = self.score_history.len().saturating_sub(n);
        &self.score_history[start..]
    }
}

/// Where progress lives between runs.
pub trait ProgressStore: Send + Sync {
    fn load(&self) -> Result<ProgressState>;
    fn save(&self, state: &ProgressState) -> Result<()>;
}

/// Progress as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProgressStore for JsonProgressStore {
    /// A missing file is a fresh learner.
    fn load(&self) -> Result<ProgressState> {
        if !self.path.exists() {
            return Ok(ProgressState::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read progress file: {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse progress file: {}", self.path.display()))
    }

    /// Written to a sibling temp file and renamed into place, so a crash
    /// never leaves a half-written file.
    fn save(&self, state: &ProgressState) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let json = serde_json::to_string_pretty(state).context("Failed to serialize progress")?;
        let tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        std::fs::write(tmp.path(), json).context("Failed to write progress")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace progress file: {}", self.path.display()))?;
        Ok(())
    }
}

/// Serializes load-modify-save so concurrent analyses don't lose updates.
pub struct ProgressTracker {
    store: Box<dyn ProgressStore>,
    lock: Mutex<()>,
}

impl ProgressTracker {
    pub fn new(store: Box<dyn ProgressStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Current state without recording anything.
    pub fn snapshot(&self) -> Result<ProgressState> {
        self.store.load()
    }

    /// Record one attempt and return the updated state.
    pub fn record(&self, today: NaiveDate, phrase_id: &str, score: u32) -> Result<ProgressState> {
        // The guard protects no data, so a poisoned lock is still usable.
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.store.load()?;
        state.record(today, phrase_id, score);
        self.store.save(&state)?;

        debug!(
            phrase = phrase_id,
            score,
            streak = state.current_streak,
            sessions = state.total_sessions,
            "progress recorded"
        );
        Ok(state)
    }
}
