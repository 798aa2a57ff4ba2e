//! Fresh column catalog reads from usage databases.

use super::{
    error::{LicenseMonitorServiceError, LicenseMonitorServiceResult},
    timeouts::bounded_store_call,
};
use crate::license_server::{
    domain::{ColumnName, UsageDatabasePath},
    ports::SampleStore,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Lists the columns a usage database currently offers.
///
/// Nothing is cached: every call opens the database again.
pub struct ColumnCatalog<S>
where
    S: SampleStore,
{
    store: Arc<S>,
    timeout: Duration,
}

impl<S> ColumnCatalog<S>
where
    S: SampleStore,
{
    /// Creates a catalog reader bounded by `timeout` per call.
    #[must_use]
    pub const fn new(store: Arc<S>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Returns the database's column names in storage order.
    ///
    /// Names that are not valid column names are skipped; repeated names keep
    /// their first position.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseMonitorServiceError::SourceUnavailable`] when `path`
    /// is `None`, the database cannot be read, or the read times out.
    pub async fn list_columns(
        &self,
        path: Option<&UsageDatabasePath>,
    ) -> LicenseMonitorServiceResult<Vec<ColumnName>> {
        let database = path.ok_or_else(|| {
            LicenseMonitorServiceError::source_unavailable("no usage database is configured")
        })?;

        let reported = bounded_store_call(self.timeout, database, async {
            let source = self.store.open(database.as_path()).await?;
            self.store.list_columns(&source).await
        })
        .await?;

        let mut seen = BTreeSet::new();
        let mut catalog = Vec::with_capacity(reported.len());
        for name in reported {
            match ColumnName::new(name.as_str()) {
                Ok(column) => {
                    if seen.insert(column.clone()) {
                        catalog.push(column);
                    }
                }
                Err(err) => {
                    warn!(path = %database, column = %name, error = %err, "skipping column");
                }
            }
        }
        debug!(path = %database, columns = catalog.len(), "listed usage database columns");
        Ok(catalog)
    }
}
