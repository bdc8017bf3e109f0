use std::path::Path;

use console::style;

use crate::analysis::references::ReferenceLibrary;
use crate::coach::AnalysisReport;
use crate::config::AppConfig;
use crate::paths;
use crate::phrases::PhraseBook;
use crate::storage::progress::ProgressState;

/// Print one scored attempt.
pub fn print_report(source: &Path, report: &AnalysisReport, graph: Option<&Path>) {
    let score = report.score.final_score;
    println!(
        "{}  {}",
        style(source.display()).bold(),
        style(&report.phrase_id).cyan()
    );
    println!("  Score:    {}", score_style(score));
    println!("  Feedback: {}", report.score.feedback_message);

    if let Some(heard) = &report.heard_text {
        let mark = if report.score.text_matched {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  Heard:    {heard} {mark}");
    }

    if !report.regions.is_empty() {
        let labels: Vec<&str> = report.regions.iter().map(|r| r.label.as_str()).collect();
        println!("  Syllables: {}", style(labels.join(" · ")).dim());
    }

    if let Some(progress) = &report.progress {
        println!(
            "  Streak:   {} day(s), {} session(s)",
            progress.current_streak, progress.total_sessions
        );
    }

    if let Some(path) = graph {
        println!("  Graph:    {}", style(path.display()).green());
    }

    println!(
        "  {}",
        style(format!("analyzed in {} ms", report.processing_ms)).dim()
    );
    println!();
}

pub fn print_not_found(source: &Path, phrase_id: &str, references_dir: &Path) {
    println!(
        "{}  {}",
        style(source.display()).bold(),
        style(format!("No reference recording for '{phrase_id}'")).red()
    );
    println!(
        "  Add {}.wav to {} or run `pitchcoach phrases`.",
        phrase_id,
        style(references_dir.display()).dim()
    );
    println!();
}

pub fn print_phrases(phrases: &PhraseBook, references: &ReferenceLibrary) {
    println!("{}", style("=== Phrases ===").bold());
    println!();
    for id in phrases.ids() {
        let status = if references.contains(id) {
            style("ready").green()
        } else {
            style("no reference").yellow()
        };
        let syllables = phrases.syllables(id).unwrap_or_default().join(" ");
        println!("  {:<22} {:<14} {}", id, status, style(syllables).dim());
    }
    println!();
    println!(
        "  {} phrase(s), {} reference recording(s)",
        phrases.len(),
        references.len()
    );
    println!();
}

pub fn print_stats(state: &ProgressState, last: usize) {
    println!("{}", style("=== Progress ===").bold());
    println!();

    if state.total_sessions == 0 {
        println!("No practice sessions recorded yet.");
        return;
    }

    println!("  Current streak: {} day(s)", style(state.current_streak).cyan());
    println!("  Best streak:    {} day(s)", state.best_streak);
    println!("  Sessions:       {}", state.total_sessions);
    if let Some(date) = state.last_practice_date {
        println!("  Last practice:  {date}");
    }
    if let Some(avg) = state.average_score() {
        println!("  Average score:  {avg:.1}");
    }

    let recent = state.recent(last);
    if !recent.is_empty() {
        println!();
        println!("{}", style("  Recent").bold());
        for entry in recent.iter().rev() {
            println!(
                "    {}  {:<22} {}",
                entry.date,
                entry.phrase_id,
                score_style(entry.score)
            );
        }
    }
    println!();
}

pub fn print_paths(config: &AppConfig) {
    let show = |label: &str, path: &Path| {
        let exists = if path.exists() { "" } else { " (missing)" };
        println!("  {label:<12} {}{}", path.display(), style(exists).dim());
    };

    show("Config", &paths::config_file());
    show("Phrases", &config.storage.phrases_file());
    show("References", &config.storage.references_dir());
    show("Progress", &config.storage.progress_file());
    show("Graphs", &paths::graphs_dir());
}

fn score_style(score: u32) -> console::StyledObject<String> {
    let text = format!("{score}/100");
    if score >= 80 {
        style(text).green().bold()
    } else if score >= 50 {
        style(text).yellow()
    } else {
        style(text).red()
    }
}
