//! Read port for round-robin usage databases.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for sample store operations.
pub type SampleStoreResult<T> = Result<T, SampleStoreError>;

/// An opened usage database.
///
/// Opening only checks that the database is readable; no handle is kept, so
/// every call sees the file as it is at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSource {
    path: Utf8PathBuf,
}

impl SampleSource {
    /// Wraps a database path that an adapter has verified.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the database path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

/// One consolidated sample row as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    /// Sample timestamp.
    pub timestamp: DateTime<Utc>,
    /// One value per [`SampleFrame::columns`] entry; `None` is unknown.
    pub values: Vec<Option<f64>>,
}

/// Samples returned by a range query.
///
/// Adapters may return more columns than requested.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleFrame {
    /// Column names, in the order of each row's values.
    pub columns: Vec<String>,
    /// Rows in the store's native interval.
    pub rows: Vec<SampleRow>,
}

/// Read contract for usage databases.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Opens the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SampleStoreError::Unavailable`] when the database is missing
    /// or unreadable.
    async fn open(&self, path: &Utf8Path) -> SampleStoreResult<SampleSource>;

    /// Lists the database's column names in storage order.
    async fn list_columns(&self, source: &SampleSource) -> SampleStoreResult<Vec<String>>;

    /// Returns samples of `columns` between `start` and `end`.
    async fn query_range(
        &self,
        source: &SampleSource,
        columns: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SampleStoreResult<SampleFrame>;
}

/// Errors returned by sample store adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SampleStoreError {
    /// The database could not be opened or read.
    #[error("usage database {path} is unavailable: {reason}")]
    Unavailable {
        /// Database path.
        path: Utf8PathBuf,
        /// Failure description.
        reason: String,
    },

    /// The store answered with data that could not be interpreted.
    #[error("usage database {path} returned malformed data: {reason}")]
    Malformed {
        /// Database path.
        path: Utf8PathBuf,
        /// Failure description.
        reason: String,
    },
}

impl SampleStoreError {
    /// Creates an unavailable-database error.
    #[must_use]
    pub fn unavailable(path: &Utf8Path, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }

    /// Creates a malformed-data error.
    #[must_use]
    pub fn malformed(path: &Utf8Path, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}
