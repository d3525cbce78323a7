use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "insight-index", about = "Semantic insight index: record insights, find similar ones")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed a text and record it with its metadata
    Add {
        /// Insight text to embed
        text: String,
        /// JSON metadata stored alongside the text (defaults to {"text": <text>})
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Find recorded insights similar to a text
    Search {
        text: String,
        #[arg(long, default_value_t = crate::DEFAULT_TOP_K)]
        top_k: usize,
        /// Include position and squared L2 distance for each hit
        #[arg(long)]
        scores: bool,
    },
    /// Show index statistics
    Stats,
}
