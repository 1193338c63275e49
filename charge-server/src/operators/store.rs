//! Station store boundary.
//!
//! Persistence lives outside this service. The roster only needs the
//! operator and country of each station, so that is all the trait exposes.

use std::path::PathBuf;

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::debug;

/// Errors from reading the station store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store could not be read.
    #[error("station store unavailable: {0}")]
    Unavailable(String),

    /// Store contents could not be decoded.
    #[error("station store data is malformed: {0}")]
    Malformed(String),
}

/// The operator and country of one persisted station.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperatorRow {
    #[serde(rename = "operator", default)]
    pub operator_name: Option<String>,

    #[serde(default)]
    pub country: Option<String>,
}

impl OperatorRow {
    pub fn new(operator_name: Option<String>, country: Option<String>) -> Self {
        Self {
            operator_name,
            country,
        }
    }
}

/// Read access to persisted stations.
pub trait StationStore: Send + Sync {
    /// Fetch the operator/country pair of every station.
    fn operator_rows(&self) -> BoxFuture<'_, Result<Vec<OperatorRow>, StoreError>>;
}

/// Store backed by a fixed set of rows.
///
/// Used when no store file is configured, and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStationStore {
    rows: Vec<OperatorRow>,
    failure: Option<String>,
}

impl InMemoryStationStore {
    /// Create a store holding `rows`.
    pub fn new(rows: Vec<OperatorRow>) -> Self {
        Self {
            rows,
            failure: None,
        }
    }

    /// Create a store whose every read fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

impl StationStore for InMemoryStationStore {
    fn operator_rows(&self) -> BoxFuture<'_, Result<Vec<OperatorRow>, StoreError>> {
        Box::pin(async move {
            match &self.failure {
                Some(message) => Err(StoreError::Unavailable(message.clone())),
                None => Ok(self.rows.clone()),
            }
        })
    }
}

/// Store backed by a JSON array of station records on disk.
///
/// Each record needs at most `operator` and `country`; other fields are
/// ignored. The file is re-read on every call so external updates show up
/// without a restart.
#[derive(Debug, Clone)]
pub struct JsonFileStationStore {
    path: PathBuf,
}

impl JsonFileStationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StationStore for JsonFileStationStore {
    fn operator_rows(&self) -> BoxFuture<'_, Result<Vec<OperatorRow>, StoreError>> {
        Box::pin(async move {
            let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                StoreError::Unavailable(format!("failed to read {}: {}", self.path.display(), e))
            })?;

            let rows: Vec<OperatorRow> = serde_json::from_str(&contents)
                .map_err(|e| StoreError::Malformed(e.to_string()))?;

            debug!(path = %self.path.display(), rows = rows.len(), "read station store");
            Ok(rows)
        })
    }
}
