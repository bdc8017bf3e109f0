use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pitchcoach")]
#[command(about = "Score Japanese pronunciation by comparing your pitch contour to a native reference")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score one or more recordings of a phrase
    Analyze {
        /// Phrase id, e.g. HelloMale (see `pitchcoach phrases`)
        #[arg(long)]
        phrase: String,

        /// WAV recordings to score (analyzed concurrently)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Where to write pitch graphs (default: data dir)
        #[arg(long)]
        graph_dir: Option<PathBuf>,

        /// Don't draw pitch graphs
        #[arg(long)]
        no_graph: bool,

        /// Skip speech recognition; only pitch is scored
        #[arg(long)]
        no_transcribe: bool,

        /// Print results as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// List phrases, their syllables and whether a reference is installed
    Phrases,

    /// Show practice streaks and recent scores
    Stats {
        /// Number of recent attempts to show
        #[arg(long, default_value_t = 10)]
        last: usize,
    },

    /// Show config and data file locations
    Paths,
}
