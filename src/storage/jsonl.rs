//! JSONL (JSON Lines) snapshot files.
//!
//! Each line is one `TournamentWeek` with its teams and players. Snapshot
//! files let the query flows run without a database connection.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{RepositoryError, StatisticsRepository};
use crate::models::TournamentWeek;

/// Errors that can occur reading or writing JSONL files.
#[derive(Debug, Error)]
pub enum JsonlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record on line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, JsonlError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
        }

        writer.flush()?;
        info!("Wrote {} records to {:?}", entities.len(), self.path);

        Ok(entities.len())
    }
}

/// JSONL file reader. Blank lines are skipped; any other line that does not
/// parse fails the whole read.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Read all entities from the file.
    pub fn read_all(&self) -> Result<Vec<T>, JsonlError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let entity = serde_json::from_str(&line).map_err(|source| JsonlError::InvalidLine {
                line: index + 1,
                source,
            })?;
            entities.push(entity);
        }

        debug!("Read {} records from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

/// Repository backed by a JSONL snapshot file.
pub struct SnapshotFileRepository {
    path: PathBuf,
}

impl SnapshotFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl From<JsonlError> for RepositoryError {
    fn from(e: JsonlError) -> Self {
        match e {
            JsonlError::Io(_) => RepositoryError::Unavailable(e.to_string()),
            other => RepositoryError::QueryFailed(other.to_string()),
        }
    }
}

#[async_trait]
impl StatisticsRepository for SnapshotFileRepository {
    fn name(&self) -> &'static str {
        "snapshot-file"
    }

    async fn fetch_all_weeks(&self) -> Result<Vec<TournamentWeek>, RepositoryError> {
        let reader = JsonlReader::<TournamentWeek>::new(self.path.clone());
        let weeks = tokio::task::spawn_blocking(move || reader.read_all())
            .await
            .map_err(|e| RepositoryError::Unavailable(format!("Snapshot read task failed: {}", e)))??;
        Ok(weeks)
    }
}
