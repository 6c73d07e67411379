//! Read-only access to tournament statistics.
//!
//! Every call returns a fully materialised snapshot of all weeks. Backends:
//! - MySQL statistics database (`mysql`)
//! - JSON Lines snapshot files (`jsonl`)
//! - In-memory snapshots (`StaticRepository`)

pub mod jsonl;
pub mod mysql;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::TournamentWeek;

pub use jsonl::{JsonlReader, JsonlWriter, SnapshotFileRepository};
pub use mysql::MySqlRepository;

/// Errors that can occur while reading a snapshot.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Statistics store unavailable: {0}")]
    Unavailable(String),

    #[error("Statistics query failed: {0}")]
    QueryFailed(String),
}

/// Source of tournament snapshots.
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Read every week with its team and player results.
    ///
    /// An empty snapshot means no tournaments have been recorded yet.
    async fn fetch_all_weeks(&self) -> Result<Vec<TournamentWeek>, RepositoryError>;
}

/// Repository serving a fixed in-memory snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticRepository {
    weeks: Vec<TournamentWeek>,
}

impl StaticRepository {
    pub fn new(weeks: Vec<TournamentWeek>) -> Self {
        Self { weeks }
    }
}

#[async_trait]
impl StatisticsRepository for StaticRepository {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_all_weeks(&self) -> Result<Vec<TournamentWeek>, RepositoryError> {
        Ok(self.weeks.clone())
    }
}
