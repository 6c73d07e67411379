//! Command dispatch.
//!
//! Each slash command is a [`Command`] variant carrying its validated
//! parameters. [`StatsService`] runs a command end to end: snapshot fetch,
//! aggregation, name resolution for the rendered rows only, formatting.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::calculate::{leaderboard, player_report, StatsError, LEADERBOARD_SIZE};
use crate::config::DisplayConfig;
use crate::format::{render_leaderboard, render_player_not_found, render_player_report, Reply};
use crate::models::{LeaderboardKind, PlayerUuid};
use crate::resolver::{resolve_names, NameResolver};
use crate::storage::{RepositoryError, StatisticsRepository};

pub const TOP_COMMAND: &str = "mcftop";
pub const SOLO_TOP_COMMAND: &str = "mcfsolotop";
pub const STATS_COMMAND: &str = "mcfstats";
pub const USERNAME_OPTION: &str = "username";

/// Errors raised while handling a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing required option '{option}' for /{command}")]
    MissingOption {
        command: &'static str,
        option: &'static str,
    },
}

impl CommandError {
    /// Text shown to the requester. Causes stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Repository(_) => "An error occurred. Please try again later.".to_string(),
            CommandError::UnknownCommand(name) => format!("Unknown command: /{}", name),
            CommandError::MissingOption { option, .. } => {
                format!("Please provide the {} option.", option)
            }
        }
    }
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Top,
    SoloTop,
    Stats { username: String },
}

impl Command {
    /// Parse a command name and its `(name, value)` string options.
    pub fn parse(name: &str, options: &[(&str, &str)]) -> Result<Self, CommandError> {
        match name {
            TOP_COMMAND => Ok(Command::Top),
            SOLO_TOP_COMMAND => Ok(Command::SoloTop),
            STATS_COMMAND => {
                let username = options
                    .iter()
                    .find(|(option, _)| *option == USERNAME_OPTION)
                    .map(|(_, value)| value.trim())
                    .filter(|value| !value.is_empty())
                    .ok_or(CommandError::MissingOption {
                        command: STATS_COMMAND,
                        option: USERNAME_OPTION,
                    })?;
                Ok(Command::Stats {
                    username: username.to_string(),
                })
            }
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Top => TOP_COMMAND,
            Command::SoloTop => SOLO_TOP_COMMAND,
            Command::Stats { .. } => STATS_COMMAND,
        }
    }

    /// Generic failure text for this command.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Command::Top => "An error occurred while fetching the leaderboard. Please try again later.",
            Command::SoloTop => {
                "An error occurred while fetching the solo leaderboard. Please try again later."
            }
            Command::Stats { .. } => "An error occurred while fetching MCF stats. Please try again later.",
        }
    }
}

/// Declaration of a slash command option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Declaration of a slash command, used for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<OptionDefinition>,
}

/// Every command the bot serves.
pub fn command_definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition {
            name: TOP_COMMAND,
            description: "Get the top mcf players",
            options: Vec::new(),
        },
        CommandDefinition {
            name: SOLO_TOP_COMMAND,
            description: "Get the top solo mcf players",
            options: Vec::new(),
        },
        CommandDefinition {
            name: STATS_COMMAND,
            description: "Check the MCF stats of a user by their username",
            options: vec![OptionDefinition {
                name: USERNAME_OPTION,
                description: "The username of the minecraft player to check",
                required: true,
            }],
        },
    ]
}

/// Runs commands against a repository and a name resolver.
pub struct StatsService {
    repository: Arc<dyn StatisticsRepository>,
    resolver: Arc<dyn NameResolver>,
    display: DisplayConfig,
}

impl StatsService {
    pub fn new(
        repository: Arc<dyn StatisticsRepository>,
        resolver: Arc<dyn NameResolver>,
        display: DisplayConfig,
    ) -> Self {
        Self {
            repository,
            resolver,
            display,
        }
    }

    /// Run one command. A fresh snapshot is read on every call.
    pub async fn execute(&self, command: &Command) -> Result<Reply, CommandError> {
        match command {
            Command::Top => self.leaderboard(LeaderboardKind::Team).await,
            Command::SoloTop => self.leaderboard(LeaderboardKind::Solo).await,
            Command::Stats { username } => self.player_stats(username).await,
        }
    }

    async fn leaderboard(&self, kind: LeaderboardKind) -> Result<Reply, CommandError> {
        let weeks = self.repository.fetch_all_weeks().await?;
        let entries = leaderboard(&weeks, kind);
        debug!(
            "Computed {} leaderboard from {} weeks via {}",
            kind,
            weeks.len(),
            self.repository.name()
        );

        let uuids: Vec<PlayerUuid> = entries
            .iter()
            .take(LEADERBOARD_SIZE)
            .filter(|entry| entry.wins > 0)
            .map(|entry| entry.uuid.clone())
            .collect();
        let names = resolve_names(self.resolver.as_ref(), &uuids).await;

        Ok(render_leaderboard(kind, &entries, &names, &self.display))
    }

    async fn player_stats(&self, username: &str) -> Result<Reply, CommandError> {
        let weeks = self.repository.fetch_all_weeks().await?;
        match player_report(&weeks, username) {
            Ok(report) => Ok(render_player_report(&report, &self.display)),
            Err(StatsError::PlayerNotFound { username }) => {
                debug!("No MCF results for {}", username);
                Ok(render_player_not_found(&username))
            }
        }
    }
}
