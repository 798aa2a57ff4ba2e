//! In-memory sample store for usage read tests.

use crate::license_server::ports::{
    SampleFrame, SampleRow, SampleSource, SampleStore, SampleStoreError, SampleStoreResult,
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory stand-in for a directory of usage databases.
///
/// Databases can be installed, rewritten and removed while readers are
/// active, which models an external process rotating the files.
#[derive(Debug, Clone, Default)]
pub struct InMemorySampleStore {
    databases: Arc<RwLock<HashMap<Utf8PathBuf, InMemoryDatabase>>>,
    range_queries: Arc<AtomicUsize>,
}

#[derive(Debug, Clone, Default)]
struct InMemoryDatabase {
    columns: Vec<String>,
    samples: BTreeMap<DateTime<Utc>, Vec<Option<f64>>>,
}

fn lock_error(path: &Utf8Path, err: impl std::fmt::Display) -> SampleStoreError {
    SampleStoreError::unavailable(path, err.to_string())
}

impl InMemorySampleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs or replaces the database at `path` with the given columns and
    /// no samples.
    ///
    /// # Errors
    ///
    /// Returns [`SampleStoreError::Unavailable`] when lock acquisition fails.
    pub fn put_database(
        &self,
        path: impl Into<Utf8PathBuf>,
        columns: &[&str],
    ) -> SampleStoreResult<()> {
        let database_path = path.into();
        let mut databases = self
            .databases
            .write()
            .map_err(|err| lock_error(&database_path, err))?;
        databases.insert(
            database_path,
            InMemoryDatabase {
                columns: columns.iter().map(|column| (*column).to_owned()).collect(),
                samples: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Records one sample row with a value per database column.
    ///
    /// # Errors
    ///
    /// Returns [`SampleStoreError::Unavailable`] when no database exists at
    /// `path`, or [`SampleStoreError::Malformed`] when the value count does
    /// not match the column count.
    pub fn push_sample(
        &self,
        path: &Utf8Path,
        timestamp: DateTime<Utc>,
        values: Vec<Option<f64>>,
    ) -> SampleStoreResult<()> {
        let mut databases = self.databases.write().map_err(|err| lock_error(path, err))?;
        let database = databases
            .get_mut(path)
            .ok_or_else(|| SampleStoreError::unavailable(path, "no such database"))?;
        if values.len() != database.columns.len() {
            return Err(SampleStoreError::malformed(
                path,
                format!(
                    "expected {} values, got {}",
                    database.columns.len(),
                    values.len()
                ),
            ));
        }
        database.samples.insert(timestamp, values);
        Ok(())
    }

    /// Removes the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SampleStoreError::Unavailable`] when lock acquisition fails.
    pub fn remove_database(&self, path: &Utf8Path) -> SampleStoreResult<()> {
        let mut databases = self.databases.write().map_err(|err| lock_error(path, err))?;
        databases.remove(path);
        Ok(())
    }

    /// Returns how many range queries have been served.
    #[must_use]
    pub fn range_query_count(&self) -> usize {
        self.range_queries.load(Ordering::SeqCst)
    }

    fn database(&self, path: &Utf8Path) -> SampleStoreResult<InMemoryDatabase> {
        let databases = self.databases.read().map_err(|err| lock_error(path, err))?;
        databases
            .get(path)
            .cloned()
            .ok_or_else(|| SampleStoreError::unavailable(path, "no such database"))
    }
}

#[async_trait]
impl SampleStore for InMemorySampleStore {
    async fn open(&self, path: &Utf8Path) -> SampleStoreResult<SampleSource> {
        self.database(path)?;
        Ok(SampleSource::new(path))
    }

    async fn list_columns(&self, source: &SampleSource) -> SampleStoreResult<Vec<String>> {
        Ok(self.database(source.path())?.columns)
    }

    async fn query_range(
        &self,
        source: &SampleSource,
        columns: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SampleStoreResult<SampleFrame> {
        self.range_queries.fetch_add(1, Ordering::SeqCst);
        let database = self.database(source.path())?;

        let positions: Vec<(String, usize)> = columns
            .iter()
            .filter_map(|column| {
                database
                    .columns
                    .iter()
                    .position(|stored| stored == column)
                    .map(|index| (column.clone(), index))
            })
            .collect();

        let rows = database
            .samples
            .range(start..=end)
            .map(|(timestamp, values)| SampleRow {
                timestamp: *timestamp,
                values: positions
                    .iter()
                    .map(|(_, index)| values.get(*index).copied().flatten())
                    .collect(),
            })
            .collect();

        Ok(SampleFrame {
            columns: positions.into_iter().map(|(column, _)| column).collect(),
            rows,
        })
    }
}
