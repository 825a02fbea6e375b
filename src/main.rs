use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use creator_graph::{
    config::Config, utils::init_logger, CreatorChannel, CreatorGraphPipeline, VideoTranscript,
};

/// Analyze a creator's transcripts and print the resulting creator graph as JSON
#[derive(Debug, Parser)]
#[command(name = "creator-graph", version, about)]
struct Args {
    /// JSON file holding an array of video transcripts
    #[arg(short, long)]
    transcripts: PathBuf,

    #[arg(long)]
    user_id: String,

    #[arg(long)]
    channel_id: String,

    #[arg(long)]
    channel_name: String,

    #[arg(long, default_value_t = 0)]
    total_views: u64,

    #[arg(long, default_value_t = 0)]
    subscribers: u64,

    /// Write the graph here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_env()?;
    let _log_guard = init_logger(&config.logging);
    info!(provider = %config.llm.provider, model = %config.llm.model, "Configuration loaded");

    let raw = tokio::fs::read_to_string(&args.transcripts)
        .await
        .with_context(|| format!("Failed to read {}", args.transcripts.display()))?;
    let transcripts: Vec<VideoTranscript> =
        serde_json::from_str(&raw).context("Transcript file is not a JSON array of transcripts")?;

    let pipeline = CreatorGraphPipeline::from_config(&config)?;

    let channel = CreatorChannel {
        user_id: args.user_id,
        channel_id: args.channel_id,
        channel_name: args.channel_name,
        total_views: args.total_views,
        subscriber_count: args.subscribers,
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling analysis");
            on_interrupt.cancel();
        }
    });

    let graph = pipeline
        .analyze_creator_graph(&channel, transcripts, &cancel)
        .await?;

    let json = serde_json::to_string_pretty(&graph)?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Creator graph written");
        }
        None => println!("{}", json),
    }

    Ok(())
}
