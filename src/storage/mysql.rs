//! MySQL statistics database.
//!
//! Reads the `mcf_week`, `mcf_team_result`, `mcf_player_results` and
//! `mcf_users` tables with three set-based queries and assembles the snapshot
//! in memory.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::FromRow;
use tracing::{debug, error, info};

use super::{RepositoryError, StatisticsRepository};
use crate::config::DatabaseConfig;
use crate::models::{PlayerResult, TeamResult, TournamentWeek};

const WEEKS_QUERY: &str = r#"
    SELECT CAST(id AS SIGNED) AS id,
           CAST(tournament_date AS DATE) AS tournament_date,
           display_name
    FROM mcf_week
    ORDER BY id
"#;

const TEAMS_QUERY: &str = r#"
    SELECT CAST(week_id AS SIGNED) AS week_id,
           CAST(team_number AS SIGNED) AS team_number,
           CAST(team_score AS SIGNED) AS team_score
    FROM mcf_team_result
    ORDER BY week_id, team_number
"#;

// Results whose user row is missing drop out of the inner join.
const PLAYERS_QUERY: &str = r#"
    SELECT CAST(r.week_id AS SIGNED) AS week_id,
           CAST(r.user_id AS SIGNED) AS user_id,
           CAST(r.team_number AS SIGNED) AS team_number,
           CAST(r.score AS SIGNED) AS score,
           CAST(r.kills AS SIGNED) AS kills,
           u.uuid AS uuid,
           u.username AS username
    FROM mcf_player_results AS r
    INNER JOIN mcf_users AS u ON u.id = r.user_id
    ORDER BY r.id
"#;

#[derive(Debug, FromRow)]
struct WeekRow {
    id: i64,
    tournament_date: NaiveDate,
    display_name: String,
}

#[derive(Debug, FromRow)]
struct TeamRow {
    week_id: i64,
    team_number: i64,
    team_score: i64,
}

#[derive(Debug, FromRow)]
struct PlayerRow {
    week_id: i64,
    user_id: i64,
    team_number: i64,
    score: i64,
    kills: i64,
    uuid: String,
    username: String,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => RepositoryError::Unavailable(e.to_string()),
            other => RepositoryError::QueryFailed(other.to_string()),
        }
    }
}

/// Repository over the MySQL statistics database.
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Build a lazily connected pool. No connection is opened until the
    /// first query; callers queue once `max_connections` are checked out.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.hostname)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_lazy_with(options);

        info!(
            "MySQL pool created for {}:{}/{} (max {} connections)",
            config.hostname, config.port, config.database, config.max_connections
        );

        Self { pool }
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Try to check out a connection. Failures are logged, not returned.
    pub async fn check_connection(&self) -> bool {
        match self.pool.acquire().await {
            Ok(_) => {
                info!("Successfully connected to statistics database");
                true
            }
            Err(e) => {
                error!("Failed to connect to statistics database: {}", e);
                false
            }
        }
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        info!("Closing statistics database connection pool...");
        self.pool.close().await;
    }
}

#[async_trait]
impl StatisticsRepository for MySqlRepository {
    fn name(&self) -> &'static str {
        "mysql"
    }

    async fn fetch_all_weeks(&self) -> Result<Vec<TournamentWeek>, RepositoryError> {
        let (weeks, teams, players) = tokio::try_join!(
            sqlx::query_as::<_, WeekRow>(WEEKS_QUERY).fetch_all(&self.pool),
            sqlx::query_as::<_, TeamRow>(TEAMS_QUERY).fetch_all(&self.pool),
            sqlx::query_as::<_, PlayerRow>(PLAYERS_QUERY).fetch_all(&self.pool),
        )?;

        let snapshot = assemble_weeks(weeks, teams, players)?;
        debug!("Loaded {} MCF weeks from MySQL", snapshot.len());
        Ok(snapshot)
    }
}

/// Group team and player rows under their weeks, preserving row order.
fn assemble_weeks(
    weeks: Vec<WeekRow>,
    teams: Vec<TeamRow>,
    players: Vec<PlayerRow>,
) -> Result<Vec<TournamentWeek>, RepositoryError> {
    let mut snapshot: Vec<TournamentWeek> = weeks
        .into_iter()
        .map(|row| TournamentWeek::new(row.id, row.tournament_date, row.display_name))
        .collect();

    let slots: HashMap<i64, usize> = snapshot
        .iter()
        .enumerate()
        .map(|(slot, week)| (week.id, slot))
        .collect();

    for row in teams {
        let Some(&slot) = slots.get(&row.week_id) else {
            debug!("Skipping team result for unknown week {}", row.week_id);
            continue;
        };
        snapshot[slot].teams.push(TeamResult::new(
            column("team_number", row.team_number)?,
            column("team_score", row.team_score)?,
        ));
    }

    for row in players {
        let Some(&slot) = slots.get(&row.week_id) else {
            debug!("Skipping player result for unknown week {}", row.week_id);
            continue;
        };
        let player = PlayerResult::new(
            row.uuid,
            row.username,
            column("team_number", row.team_number)?,
            column("score", row.score)?,
            column("kills", row.kills)?,
        )
        .with_player_id(row.user_id);
        snapshot[slot].players.push(player);
    }

    Ok(snapshot)
}

/// Convert a column value, rejecting values outside the model's range.
fn column<T: TryFrom<i64>>(name: &str, value: i64) -> Result<T, RepositoryError> {
    T::try_from(value)
        .map_err(|_| RepositoryError::QueryFailed(format!("{} out of range: {}", name, value)))
}
