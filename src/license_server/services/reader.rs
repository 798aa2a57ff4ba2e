//! Usage time-series reads over subscribed columns.

use super::{
    error::{LicenseMonitorServiceError, LicenseMonitorServiceResult},
    timeouts::bounded_store_call,
};
use crate::license_server::{
    domain::{ColumnName, TimeSeriesRow, UsageDatabasePath, UsagePeriod},
    ports::{SampleFrame, SampleStore},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Reads the subscribed columns of a usage database over a period.
pub struct TimeSeriesReader<S, C>
where
    S: SampleStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    timeout: Duration,
}

impl<S, C> TimeSeriesReader<S, C>
where
    S: SampleStore,
    C: Clock + Send + Sync,
{
    /// Creates a reader bounded by `timeout` per call.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>, timeout: Duration) -> Self {
        Self {
            store,
            clock,
            timeout,
        }
    }

    /// Returns rows in `[now - period, now)`, oldest first.
    ///
    /// Every row carries a value for each subscribed column; columns the
    /// database no longer has read as `None`. An empty subscription set
    /// returns no rows without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseMonitorServiceError::SourceUnavailable`] when `path`
    /// is `None`, the database cannot be read, or the read times out.
    pub async fn read(
        &self,
        path: Option<&UsageDatabasePath>,
        subscribed: &BTreeSet<ColumnName>,
        period: UsagePeriod,
    ) -> LicenseMonitorServiceResult<Vec<TimeSeriesRow>> {
        if subscribed.is_empty() {
            return Ok(Vec::new());
        }
        let database = path.ok_or_else(|| {
            LicenseMonitorServiceError::source_unavailable("no usage database is configured")
        })?;

        let (start, end) = period.range_ending_at(self.clock.utc());
        let requested: Vec<String> = subscribed
            .iter()
            .map(|column| column.as_str().to_owned())
            .collect();
        let frame = bounded_store_call(self.timeout, database, async {
            let source = self.store.open(database.as_path()).await?;
            self.store.query_range(&source, &requested, start, end).await
        })
        .await?;

        let rows = shape_rows(frame, subscribed, start, end);
        debug!(
            path = %database,
            period = %period,
            rows = rows.len(),
            "read usage rows"
        );
        Ok(rows)
    }
}

fn shape_rows(
    frame: SampleFrame,
    subscribed: &BTreeSet<ColumnName>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<TimeSeriesRow> {
    let SampleFrame { columns, rows } = frame;
    let positions: Vec<(&str, Option<usize>)> = subscribed
        .iter()
        .map(|column| {
            let name = column.as_str();
            (name, columns.iter().position(|stored| stored == name))
        })
        .collect();

    let mut shaped: Vec<TimeSeriesRow> = rows
        .into_iter()
        .filter(|row| row.timestamp >= start && row.timestamp < end)
        .map(|row| TimeSeriesRow {
            timestamp: row.timestamp,
            values: positions
                .iter()
                .map(|(name, position)| {
                    let value = position.and_then(|index| row.values.get(index).copied().flatten());
                    ((*name).to_owned(), value)
                })
                .collect(),
        })
        .collect();
    shaped.sort_by_key(|row| row.timestamp);
    shaped
}
