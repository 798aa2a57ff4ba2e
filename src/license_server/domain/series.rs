//! Usage history rows and their chart-oriented reshaping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Samples of the subscribed columns at one timestamp.
///
/// `values` maps column name to sample; `None` means the store had no data
/// or the column is gone. Serialization yields sorted keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    /// Sample timestamp.
    pub timestamp: DateTime<Utc>,
    /// Sample per subscribed column.
    pub values: BTreeMap<String, Option<f64>>,
}

/// One series in the `{key, values: [[millis, value], ..]}` shape consumed by
/// stacked-area chart clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Column name.
    pub key: String,
    /// `(epoch milliseconds, sample)` pairs in ascending time order.
    pub values: Vec<(i64, Option<f64>)>,
}

/// Pivots rows into one chart series per column, ordered by column name.
#[must_use]
pub fn chart_series(rows: &[TimeSeriesRow]) -> Vec<ChartSeries> {
    let mut by_column: BTreeMap<&str, Vec<(i64, Option<f64>)>> = BTreeMap::new();
    for row in rows {
        let millis = row.timestamp.timestamp_millis();
        for (column, value) in &row.values {
            by_column
                .entry(column.as_str())
                .or_default()
                .push((millis, *value));
        }
    }

    by_column
        .into_iter()
        .map(|(key, values)| ChartSeries {
            key: key.to_owned(),
            values,
        })
        .collect()
}
