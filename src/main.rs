use clap::Parser;
use insight_index::cli::commands::{Cli, Commands};
use insight_index::config::IndexConfig;
use insight_index::InsightIndex;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let index = match IndexConfig::from_env().and_then(|config| InsightIndex::new(&config)) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Error initializing insight index: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(index, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(index: InsightIndex, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Add { text, metadata } => {
            let item: serde_json::Value = match metadata {
                Some(json) => serde_json::from_str(&json)
                    .map_err(|e| format!("Invalid metadata JSON: {e}"))?,
                None => serde_json::json!({ "text": text }),
            };
            let position = index.add_to_index(&text, item).await?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "position": position }))?);
        }
        Commands::Search { text, top_k, scores } => {
            if scores {
                let matches = index.search_with_scores(&text, top_k).await?;
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                let results = index.search_similar_insights(&text, top_k).await?;
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
        }
        Commands::Stats => {
            let stats = index.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
