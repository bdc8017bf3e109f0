mod align;
mod analysis;
mod audio;
mod cli;
mod coach;
mod config;
mod dsp;
mod paths;
mod phrases;
mod render;
mod report;
mod storage;
mod transcribe;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use analysis::extractor::PitchExtractor;
use analysis::references::ReferenceLibrary;
use cli::{Cli, Command};
use coach::{AnalysisOutcome, Coach};
use config::AppConfig;
use phrases::PhraseBook;
use storage::progress::{JsonProgressStore, ProgressTracker};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = config::load_config()?;

    match cli.command {
        Command::Analyze {
            phrase,
            files,
            graph_dir,
            no_graph,
            no_transcribe,
            json,
        } => {
            let graph_dir = (!no_graph).then(|| graph_dir.unwrap_or_else(paths::graphs_dir));
            analyze(&config, phrase, files, graph_dir, no_transcribe, json).await
        }

        Command::Phrases => {
            let phrases = PhraseBook::load(&config.storage.phrases_file())?;
            let references = load_references(&config)?;
            report::print_phrases(&phrases, &references);
            Ok(())
        }

        Command::Stats { last } => {
            let tracker = ProgressTracker::new(Box::new(JsonProgressStore::new(
                config.storage.progress_file(),
            )));
            report::print_stats(&tracker.snapshot()?, last);
            Ok(())
        }

        Command::Paths => {
            report::print_paths(&config);
            Ok(())
        }
    }
}

fn load_references(config: &AppConfig) -> Result<ReferenceLibrary> {
    let dir = config.storage.references_dir();
    let extractor = PitchExtractor::new(&config.analysis);
    let references = ReferenceLibrary::load(&dir, &extractor, true)?;
    if references.is_empty() {
        warn!(dir = %dir.display(), "no reference recordings found, every phrase will be reported missing");
    }
    Ok(references)
}

async fn analyze(
    config: &AppConfig,
    phrase: String,
    files: Vec<PathBuf>,
    graph_dir: Option<PathBuf>,
    no_transcribe: bool,
    json: bool,
) -> Result<()> {
    let phrases = PhraseBook::load(&config.storage.phrases_file())?;
    let references = Arc::new(load_references(config)?);

    let mut coach = Coach::new(config, phrases, references).with_progress(ProgressTracker::new(
        Box::new(JsonProgressStore::new(config.storage.progress_file())),
    ));

    if !no_transcribe {
        match transcribe::from_config(&config.transcription) {
            Ok(Some(t)) => coach = coach.with_transcriber(t),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "speech recognition unavailable, scoring pitch only"),
        }
    }
    if let Some(dir) = &graph_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create graph directory: {}", dir.display()))?;
        coach = coach.with_renderer(Box::new(render::PlottersRenderer));
    }

    let coach = Arc::new(coach);
    let mut tasks = JoinSet::new();
    for (index, file) in files.into_iter().enumerate() {
        let coach = Arc::clone(&coach);
        let phrase = phrase.clone();
        tasks.spawn(async move {
            let outcome = match std::fs::read(&file) {
                Ok(bytes) => coach.analyze_upload(bytes, phrase).await,
                Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to read {}", file.display()))),
            };
            (index, file, outcome)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.context("Analysis task failed")?);
    }
    results.sort_by_key(|(index, _, _)| *index);

    let mut failures = 0;
    for (_, file, outcome) in results {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                failures += 1;
                eprintln!("{} {:#}", console::style("error:").red().bold(), e);
                continue;
            }
        };

        let graph = match (&graph_dir, &outcome) {
            (Some(dir), AnalysisOutcome::Scored(report)) => match &report.graph_png {
                Some(png) => {
                    let path = paths::graph_path(dir, &report.phrase_id, &file);
                    std::fs::write(&path, png)
                        .with_context(|| format!("Failed to write graph: {}", path.display()))?;
                    Some(path)
                }
                None => None,
            },
            _ => None,
        };

        if json {
            println!("{}", serde_json::to_string(&outcome).context("Failed to serialize result")?);
            continue;
        }
        match &outcome {
            AnalysisOutcome::Scored(report) => report::print_report(&file, report, graph.as_deref()),
            AnalysisOutcome::ReferenceNotFound { phrase_id } => {
                report::print_not_found(&file, phrase_id, &config.storage.references_dir())
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} recording(s) could not be analyzed");
    }
    Ok(())
}
