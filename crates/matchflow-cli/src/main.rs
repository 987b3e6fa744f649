mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use matchflow_sdk::{EngineSettings, Environment};

const SETTINGS_ENV: &str = "MATCHFLOW_ENGINE_SETTINGS";

#[derive(Parser)]
#[command(
    name = "matchflow",
    version,
    about = "Concurrent batch driver for entity-resolution engines"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Path to an engine settings JSON file (falls back to the
    /// MATCHFLOW_ENGINE_SETTINGS env var holding the JSON itself)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load records from a newline-delimited JSON file
    Load {
        /// Path to the record file
        file: PathBuf,
        /// Concurrent engine calls (default: host parallelism)
        #[arg(long)]
        workers: Option<usize>,
        /// Request enriched with-info responses
        #[arg(long)]
        with_info: bool,
        /// Write with-info responses to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Feed the pump through a bounded queue with a separate producer
        #[arg(long)]
        via_queue: bool,
        /// Log engine stats every N successful loads
        #[arg(long)]
        stats_interval: Option<u64>,
        /// Log a progress line every N successes (default 100)
        #[arg(long)]
        progress_interval: Option<u64>,
    },
    /// Delete records listed in a newline-delimited JSON file
    Delete {
        /// Path to the record file
        file: PathBuf,
        /// Concurrent engine calls (default: host parallelism)
        #[arg(long)]
        workers: Option<usize>,
        /// Request enriched with-info responses
        #[arg(long)]
        with_info: bool,
        /// Write with-info responses to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Log a progress line every N successes (default 100)
        #[arg(long)]
        progress_interval: Option<u64>,
    },
    /// Search for entities matching attribute documents, one JSON per line
    Search {
        /// Path to the attribute document file
        file: PathBuf,
        /// Concurrent engine calls (default: host parallelism)
        #[arg(long)]
        workers: Option<usize>,
        /// Write search responses to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Continuously process the engine's redo queue until interrupted
    Redo {
        /// Concurrent engine calls (default: host parallelism)
        #[arg(long)]
        workers: Option<usize>,
        /// Request enriched with-info responses
        #[arg(long)]
        with_info: bool,
        /// Write with-info responses to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pause between polls when the queue is empty
        #[arg(long, default_value_t = 30)]
        poll_secs: u64,
        /// Log a progress line every N successes (default 100)
        #[arg(long)]
        progress_interval: Option<u64>,
    },
    /// Register data sources, or list registered ones when none are given
    Sources {
        /// Data source names to register
        names: Vec<String>,
    },
    /// Remove every record and queued redo item from the repository
    Purge {
        /// Skip the interactive confirmation
        #[arg(long)]
        force: bool,
    },
    /// Print engine workload statistics
    Stats,
}

fn load_settings(path: Option<&std::path::Path>) -> anyhow::Result<EngineSettings> {
    if let Some(path) = path {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        return Ok(EngineSettings::from_json(&json)?);
    }
    match std::env::var(SETTINGS_ENV) {
        Ok(json) => Ok(EngineSettings::from_json(&json)?),
        Err(_) => Ok(EngineSettings::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    let settings = load_settings(cli.settings.as_deref())?;
    let env = Environment::builder()
        .instance_name("matchflow")
        .settings(settings)
        .build()?;

    match cli.command {
        Commands::Load {
            file,
            workers,
            with_info,
            output,
            via_queue,
            stats_interval,
            progress_interval,
        } => {
            commands::load::execute(
                &env,
                &file,
                workers,
                with_info,
                output.as_deref(),
                via_queue,
                stats_interval,
                progress_interval,
            )
            .await
        }
        Commands::Delete {
            file,
            workers,
            with_info,
            output,
            progress_interval,
        } => {
            commands::delete::execute(
                &env,
                &file,
                workers,
                with_info,
                output.as_deref(),
                progress_interval,
            )
            .await
        }
        Commands::Search {
            file,
            workers,
            output,
        } => commands::search::execute(&env, &file, workers, output.as_deref()).await,
        Commands::Redo {
            workers,
            with_info,
            output,
            poll_secs,
            progress_interval,
        } => {
            commands::redo::execute(
                &env,
                workers,
                with_info,
                output.as_deref(),
                poll_secs,
                progress_interval,
            )
            .await
        }
        Commands::Sources { names } => commands::sources::execute(&env, &names).await,
        Commands::Purge { force } => commands::purge::execute(&env, force).await,
        Commands::Stats => commands::stats::execute(&env).await,
    }
}
