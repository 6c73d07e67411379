//! Configuration loading and validation.
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual values (`BOT_TOKEN`, `STATISTICS_DB_*`, ...).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Discord application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token
    #[serde(default)]
    pub token: String,

    /// Application (client) id; looked up through the API when absent
    #[serde(default)]
    pub application_id: Option<u64>,
}

/// Statistics database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_hostname")]
    pub hostname: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub database: String,

    /// Pool size; callers queue for a connection once it is exhausted
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a caller waits for a pooled connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_db_hostname() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            hostname: default_db_hostname(),
            port: default_db_port(),
            username: String::new(),
            password: String::new(),
            database: String::new(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

/// Username lookup service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Base URL; the player UUID is appended to it
    #[serde(default = "default_resolver_url")]
    pub base_url: String,

    #[serde(default = "default_resolver_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_resolver_url() -> String {
    "https://playerdb.co/api/player/minecraft/".to_string()
}

fn default_resolver_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("mcf-stats-bot/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_resolver_url(),
            timeout_seconds: default_resolver_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Branding and links shown in replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_logo_url")]
    pub author_icon_url: String,

    /// Thumbnail for the leaderboards
    #[serde(default = "default_logo_url")]
    pub thumbnail_url: String,

    /// Player avatar URL prefix; the player UUID is appended
    #[serde(default = "default_avatar_url")]
    pub avatar_url_base: String,

    /// Full statistics page URL prefix; the player UUID is appended
    #[serde(default = "default_full_stats_url")]
    pub full_stats_url_base: String,
}

fn default_author_name() -> String {
    "NovaBOT".to_string()
}

fn default_logo_url() -> String {
    "https://novauniverse.net/cdn/img/logos/logo.png".to_string()
}

fn default_avatar_url() -> String {
    "https://mc-heads.net/avatar/".to_string()
}

fn default_full_stats_url() -> String {
    "https://novauniverse.net/mcf_stats/?uuid=".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            author_name: default_author_name(),
            author_icon_url: default_logo_url(),
            thumbnail_url: default_logo_url(),
            avatar_url_base: default_avatar_url(),
            full_stats_url_base: default_full_stats_url(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub discord: DiscordConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            discord: DiscordConfig::default(),
            database: DatabaseConfig::default(),
            resolver: ResolverConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load the file if it exists, apply process environment overrides and
    /// validate the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("BOT_TOKEN") {
            self.discord.token = token;
        }
        if let Some(id) = lookup("CLIENT_ID") {
            self.discord.application_id = Some(parse_env("CLIENT_ID", &id)?);
        }
        if let Some(host) = lookup("STATISTICS_DB_HOSTNAME") {
            self.database.hostname = host;
        }
        if let Some(port) = lookup("STATISTICS_DB_PORT") {
            self.database.port = parse_env("STATISTICS_DB_PORT", &port)?;
        }
        if let Some(user) = lookup("STATISTICS_DB_USERNAME") {
            self.database.username = user;
        }
        if let Some(password) = lookup("STATISTICS_DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(database) = lookup("STATISTICS_DB_DATABASE") {
            self.database.database = database;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.port == 0 {
            return Err(ConfigError::ValidationError(
                "Database port must be greater than 0".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "Database pool needs at least one connection".to_string(),
            ));
        }

        if self.database.acquire_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Database acquire timeout must be greater than 0".to_string(),
            ));
        }

        if self.resolver.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Resolver timeout must be greater than 0".to_string(),
            ));
        }

        match Url::parse(&self.resolver.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Resolver base URL is not an http(s) URL: {}",
                    self.resolver.base_url
                )))
            }
        }

        Ok(())
    }

    /// Fail unless a Discord bot token is configured.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        let token = self.discord.token.trim();
        if token.is_empty() {
            return Err(ConfigError::ValidationError(
                "Discord bot token is not set (BOT_TOKEN)".to_string(),
            ));
        }
        Ok(token)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{} has an invalid value: {}", key, value)))
}
