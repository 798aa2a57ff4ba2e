//! Sample store adapter that reads round-robin databases through `rrdtool`.

use crate::license_server::ports::{
    SampleFrame, SampleRow, SampleSource, SampleStore, SampleStoreError, SampleStoreResult,
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default `rrdtool` executable name.
pub const DEFAULT_RRDTOOL_BINARY: &str = "rrdtool";

/// Default consolidation function used for fetches.
pub const DEFAULT_CONSOLIDATION: &str = "AVERAGE";

/// Reads usage databases with `rrdtool info` and `rrdtool fetch`.
#[derive(Debug, Clone)]
pub struct RrdtoolSampleStore {
    binary: Utf8PathBuf,
    consolidation: String,
}

impl Default for RrdtoolSampleStore {
    fn default() -> Self {
        Self::new(DEFAULT_RRDTOOL_BINARY, DEFAULT_CONSOLIDATION)
    }
}

impl RrdtoolSampleStore {
    /// Creates an adapter running `binary` and fetching with `consolidation`.
    #[must_use]
    pub fn new(binary: impl Into<Utf8PathBuf>, consolidation: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            consolidation: consolidation.into().trim().to_ascii_uppercase(),
        }
    }

    /// Returns the consolidation function passed to `rrdtool fetch`.
    #[must_use]
    pub fn consolidation(&self) -> &str {
        &self.consolidation
    }

    async fn run(&self, path: &Utf8Path, args: &[&str]) -> SampleStoreResult<String> {
        let output = Command::new(self.binary.as_std_path())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                SampleStoreError::unavailable(path, format!("failed to run {}: {err}", self.binary))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            warn!(path = %path, status = %output.status, "rrdtool exited with failure");
            return Err(SampleStoreError::unavailable(path, stderr));
        }

        String::from_utf8(output.stdout)
            .map_err(|err| SampleStoreError::malformed(path, err.to_string()))
    }
}

#[async_trait]
impl SampleStore for RrdtoolSampleStore {
    async fn open(&self, path: &Utf8Path) -> SampleStoreResult<SampleSource> {
        let metadata = tokio::fs::metadata(path.as_std_path())
            .await
            .map_err(|err| SampleStoreError::unavailable(path, err.to_string()))?;
        if !metadata.is_file() {
            return Err(SampleStoreError::unavailable(path, "not a regular file"));
        }
        Ok(SampleSource::new(path))
    }

    async fn list_columns(&self, source: &SampleSource) -> SampleStoreResult<Vec<String>> {
        let path = source.path();
        let info = self.run(path, &["info", path.as_str()]).await?;
        let columns = parse_info_columns(&info);
        debug!(path = %path, columns = columns.len(), "listed rrd data sources");
        Ok(columns)
    }

    async fn query_range(
        &self,
        source: &SampleSource,
        _columns: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SampleStoreResult<SampleFrame> {
        let path = source.path();
        let start_epoch = start.timestamp().to_string();
        let end_epoch = end.timestamp().to_string();
        let output = self
            .run(
                path,
                &[
                    "fetch",
                    path.as_str(),
                    self.consolidation.as_str(),
                    "--start",
                    start_epoch.as_str(),
                    "--end",
                    end_epoch.as_str(),
                ],
            )
            .await?;
        parse_fetch_output(path, &output)
    }
}

/// Returns data source names from `rrdtool info` output in index order.
#[must_use]
pub fn parse_info_columns(info: &str) -> Vec<String> {
    let mut indexed: Vec<(u64, String)> = info
        .lines()
        .filter_map(|line| {
            let (name, rest) = line.trim().strip_prefix("ds[")?.split_once("].")?;
            let index = rest.strip_prefix("index = ")?.trim().parse().ok()?;
            Some((index, name.to_owned()))
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, name)| name).collect()
}

/// Parses `rrdtool fetch` output: a header of data source names followed by
/// `epoch: value ..` rows, where `nan` marks unknown samples.
///
/// # Errors
///
/// Returns [`SampleStoreError::Malformed`] when a row cannot be read or its
/// value count does not match the header.
pub fn parse_fetch_output(path: &Utf8Path, output: &str) -> SampleStoreResult<SampleFrame> {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Ok(SampleFrame::default());
    };
    let columns: Vec<String> = header.split_whitespace().map(str::to_owned).collect();

    let rows = lines
        .map(|line| parse_fetch_row(path, line, columns.len()))
        .collect::<SampleStoreResult<Vec<SampleRow>>>()?;

    Ok(SampleFrame { columns, rows })
}

fn parse_fetch_row(path: &Utf8Path, line: &str, width: usize) -> SampleStoreResult<SampleRow> {
    let (epoch_text, values_text) = line
        .split_once(':')
        .ok_or_else(|| SampleStoreError::malformed(path, format!("row without timestamp: {line}")))?;
    let epoch: i64 = epoch_text
        .trim()
        .parse()
        .map_err(|_| SampleStoreError::malformed(path, format!("bad timestamp: {epoch_text}")))?;
    let timestamp = DateTime::from_timestamp(epoch, 0)
        .ok_or_else(|| SampleStoreError::malformed(path, format!("timestamp out of range: {epoch}")))?;

    let values = values_text
        .split_whitespace()
        .map(|token| parse_sample(path, token))
        .collect::<SampleStoreResult<Vec<Option<f64>>>>()?;
    if values.len() != width {
        return Err(SampleStoreError::malformed(
            path,
            format!("expected {width} values, got {}", values.len()),
        ));
    }

    Ok(SampleRow { timestamp, values })
}

fn parse_sample(path: &Utf8Path, token: &str) -> SampleStoreResult<Option<f64>> {
    let unsigned = token.trim_start_matches(['-', '+']);
    if unsigned.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    token
        .replace(',', ".")
        .parse::<f64>()
        .map(|value| (!value.is_nan()).then_some(value))
        .map_err(|_| SampleStoreError::malformed(path, format!("bad sample value: {token}")))
}
