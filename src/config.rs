//! Monitor configuration loaded from a JSON file.
//!
//! Every field is optional; omitted fields take the documented defaults.
//!
//! ```json
//! {
//!   "store_timeout_ms": 5000,
//!   "status_timeout_ms": 10000,
//!   "rrdtool": { "binary": "rrdtool", "consolidation": "AVERAGE" },
//!   "lmstat": { "binary": "lmutil" }
//! }
//! ```

use crate::license_server::{
    adapters::{
        DEFAULT_CONSOLIDATION, DEFAULT_LMUTIL_BINARY, DEFAULT_RRDTOOL_BINARY, LmstatStatusQuery,
        RrdtoolSampleStore,
    },
    services::{DEFAULT_STATUS_TIMEOUT, DEFAULT_STORE_TIMEOUT, ServiceTimeouts},
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// Configuration file path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        source: Arc<std::io::Error>,
    },

    /// The path does not name a file.
    #[error("configuration path {0} has no file name")]
    MissingFileName(Utf8PathBuf),

    /// The configuration is not valid JSON for [`MonitorConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(Arc<serde_json::Error>),

    /// A timeout was configured as zero.
    #[error("{field} must be greater than zero")]
    ZeroTimeout {
        /// Offending field name.
        field: &'static str,
    },
}

/// Settings for the rrdtool usage database adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RrdtoolConfig {
    /// Path or name of the `rrdtool` executable.
    pub binary: Utf8PathBuf,
    /// Consolidation function passed to `rrdtool fetch`.
    pub consolidation: String,
}

impl Default for RrdtoolConfig {
    fn default() -> Self {
        Self {
            binary: Utf8PathBuf::from(DEFAULT_RRDTOOL_BINARY),
            consolidation: DEFAULT_CONSOLIDATION.to_owned(),
        }
    }
}

/// Settings for the lmstat license manager adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LmstatConfig {
    /// Path or name of the `lmutil` executable.
    pub binary: Utf8PathBuf,
}

impl Default for LmstatConfig {
    fn default() -> Self {
        Self {
            binary: Utf8PathBuf::from(DEFAULT_LMUTIL_BINARY),
        }
    }
}

/// Top-level monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Limit for one usage database call, in milliseconds.
    pub store_timeout_ms: u64,
    /// Limit for one license manager query, in milliseconds.
    pub status_timeout_ms: u64,
    /// rrdtool adapter settings.
    pub rrdtool: RrdtoolConfig,
    /// lmstat adapter settings.
    pub lmstat: LmstatConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: duration_millis(DEFAULT_STORE_TIMEOUT),
            status_timeout_ms: duration_millis(DEFAULT_STATUS_TIMEOUT),
            rrdtool: RrdtoolConfig::default(),
            lmstat: LmstatConfig::default(),
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl MonitorConfig {
    /// Parses and validates configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid JSON or unknown fields and
    /// [`ConfigError::ZeroTimeout`] for zero timeouts.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(Arc::new(err)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, plus the
    /// errors of [`Self::from_json_str`].
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| ConfigError::MissingFileName(path.to_owned()))?;
        let parent = match path.parent() {
            Some(directory) if !directory.as_str().is_empty() => directory,
            _ => Utf8Path::new("."),
        };
        let read_error = |err: std::io::Error| ConfigError::Read {
            path: path.to_owned(),
            source: Arc::new(err),
        };

        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let text = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "store_timeout_ms",
            });
        }
        if self.status_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout {
                field: "status_timeout_ms",
            });
        }
        Ok(())
    }

    /// Returns the service time limits.
    #[must_use]
    pub const fn service_timeouts(&self) -> ServiceTimeouts {
        ServiceTimeouts::new(
            Duration::from_millis(self.store_timeout_ms),
            Duration::from_millis(self.status_timeout_ms),
        )
    }

    /// Builds the rrdtool usage database adapter.
    #[must_use]
    pub fn sample_store(&self) -> RrdtoolSampleStore {
        RrdtoolSampleStore::new(
            self.rrdtool.binary.clone(),
            self.rrdtool.consolidation.clone(),
        )
    }

    /// Builds the lmstat license manager adapter.
    #[must_use]
    pub fn status_query(&self) -> LmstatStatusQuery {
        LmstatStatusQuery::new(self.lmstat.binary.clone())
    }
}
