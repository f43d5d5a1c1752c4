//! Guaxinim CLI entry point.

use anyhow::Result;
use clap::Parser;
use guaxinim::cli::{commands, Cli, Commands};
use guaxinim::config::Settings;
use guaxinim::logging;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let level = logging::level_for_verbosity(cli.verbose, &settings.general.log_level);
    logging::init(&level, settings.log_file().as_deref())?;

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Search { query, limit } => {
            commands::run_search(query, *limit, settings).await?;
        }

        Commands::Context { query, retrieval } => {
            commands::run_context(query, retrieval, settings).await?;
        }

        Commands::Ask {
            question,
            retrieval,
            model,
        } => {
            commands::run_ask(question, retrieval, model.clone(), settings).await?;
        }

        Commands::Chat { retrieval, model } => {
            commands::run_chat(retrieval, model.clone(), settings).await?;
        }

        Commands::Guide { method } => {
            commands::run_guide(method.as_deref(), settings).await?;
        }

        Commands::Improve(args) => {
            commands::run_improve(args, settings).await?;
        }

        Commands::Tags { limit } => {
            commands::run_tags(*limit, settings)?;
        }

        Commands::Browse { tag, limit } => {
            commands::run_browse(tag, *limit, settings)?;
        }

        Commands::Embed { input, output } => {
            commands::run_embed(input.as_deref(), output.as_deref(), settings).await?;
        }

        Commands::Cache { action } => {
            commands::run_cache(action, settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
