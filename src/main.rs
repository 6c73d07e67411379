use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mcf_stats_bot::bot;
use mcf_stats_bot::commands::{Command, StatsService, STATS_COMMAND, USERNAME_OPTION};
use mcf_stats_bot::config::AppConfig;
use mcf_stats_bot::resolver::PlayerDbResolver;
use mcf_stats_bot::storage::{
    JsonlWriter, MySqlRepository, SnapshotFileRepository, StatisticsRepository,
};

#[derive(Parser)]
#[command(name = "mcf-stats-bot")]
#[command(about = "Discord bot for MCF tournament leaderboards and player statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and serve slash commands
    Run,

    /// Replace the global slash commands with the bot's commands
    RegisterCommands,

    /// Remove all global slash commands
    ClearCommands,

    /// Run one query locally and print the reply
    Query {
        #[command(subcommand)]
        target: QueryTarget,

        /// Read from a JSONL snapshot instead of the database
        #[arg(long, global = true)]
        snapshot: Option<PathBuf>,
    },

    /// Write the current database snapshot to a JSONL file
    Export {
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum QueryTarget {
    /// Winners leaderboard
    Top,

    /// Solo leaderboard
    SoloTop,

    /// Stats for one player
    Stats {
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| fmt::layer().json()))
        .with((!cli.json_logs).then(fmt::layer))
        .init();

    tracing::info!("Starting mcf-stats-bot v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run => run(&config).await?,

        Commands::RegisterCommands => {
            let token = config.require_token()?;
            let count = bot::register_commands(token, config.discord.application_id).await?;
            println!("Registered {} commands", count);
        }

        Commands::ClearCommands => {
            let token = config.require_token()?;
            bot::clear_commands(token, config.discord.application_id).await?;
            println!("Cleared all global commands");
        }

        Commands::Query { target, snapshot } => {
            let command = match target {
                QueryTarget::Top => Command::Top,
                QueryTarget::SoloTop => Command::SoloTop,
                QueryTarget::Stats { username } => {
                    Command::parse(STATS_COMMAND, &[(USERNAME_OPTION, username.as_str())])?
                }
            };
            query(&config, &command, snapshot.as_deref()).await?;
        }

        Commands::Export { output } => {
            let repository = MySqlRepository::connect_lazy(&config.database);
            let weeks = repository.fetch_all_weeks().await;
            repository.close().await;

            let weeks = weeks.context("Failed to read statistics database")?;
            let written = JsonlWriter::new(&output).write_all(&weeks)?;
            println!("Exported {} weeks to {}", written, output.display());
        }
    }

    Ok(())
}

async fn run(config: &AppConfig) -> Result<()> {
    let token = config.require_token()?;

    let repository = Arc::new(MySqlRepository::connect_lazy(&config.database));
    repository.check_connection().await;

    let resolver = Arc::new(PlayerDbResolver::new(&config.resolver)?);
    let service = Arc::new(StatsService::new(
        repository.clone(),
        resolver,
        config.display.clone(),
    ));

    let result = bot::run_bot(token, service).await;
    repository.close().await;
    result?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn query(config: &AppConfig, command: &Command, snapshot: Option<&Path>) -> Result<()> {
    let (repository, mysql): (Arc<dyn StatisticsRepository>, Option<Arc<MySqlRepository>>) =
        match snapshot {
            Some(path) => (Arc::new(SnapshotFileRepository::new(path)), None),
            None => {
                let mysql = Arc::new(MySqlRepository::connect_lazy(&config.database));
                (mysql.clone(), Some(mysql))
            }
        };

    let resolver = Arc::new(PlayerDbResolver::new(&config.resolver)?);
    let service = StatsService::new(repository, resolver, config.display.clone());

    let result = service.execute(command).await;
    if let Some(mysql) = mysql {
        mysql.close().await;
    }

    match result {
        Ok(reply) => {
            println!("{}", reply);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Error executing /{}: {}", command.name(), e);
            anyhow::bail!(command.failure_message())
        }
    }
}
