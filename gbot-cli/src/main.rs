//! gbot CLI: replay raw events through the demo router. Config from env.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gbot_cli::{build_router, replay, Cli, Commands, ConsoleDispatcher, GbotConfig};
use gbot_core::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = GbotConfig::from_env().context("Load config from .env / environment")?;
    config.validate()?;
    init_tracing(&config.log_file)?;

    match cli.command {
        Commands::Replay { file, concurrent } => handle_replay(&config, file, concurrent).await,
    }
}

/// Handle the replay command: read events, dispatch them and print one outcome per line.
async fn handle_replay(config: &GbotConfig, file: Option<PathBuf>, concurrent: bool) -> Result<()> {
    let input = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Read events from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Read events from stdin")?;
            buf
        }
    };

    let router = build_router(config, Arc::new(ConsoleDispatcher::new()));
    let outcomes = replay(&router, &input, concurrent).await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    for outcome in &outcomes {
        match &outcome.result {
            Ok(response) => println!("line {}: {:?}", outcome.line, response),
            Err(e) => println!("line {}: error: {}", outcome.line, e),
        }
    }
    println!(
        "Total: {}, Failed: {}, Users: {}",
        outcomes.len(),
        failed,
        router.store().user_count()
    );
    Ok(())
}
