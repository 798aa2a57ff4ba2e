//! Service-level error taxonomy for license monitoring.

use crate::license_server::{
    domain::{LicenseServerDomainError, ParseUsagePeriodError, ServerId, VendorName},
    ports::{LicenseServerRepositoryError, LicenseStatusError, SampleStoreError},
};
use thiserror::Error;

/// Result type for license monitoring services.
pub type LicenseMonitorServiceResult<T> = Result<T, LicenseMonitorServiceError>;

/// Errors returned by license monitoring services.
#[derive(Debug, Clone, Error)]
pub enum LicenseMonitorServiceError {
    /// Submitted server settings failed validation.
    #[error(transparent)]
    Domain(#[from] LicenseServerDomainError),

    /// The requested usage period is not recognised.
    #[error(transparent)]
    InvalidPeriod(#[from] ParseUsagePeriodError),

    /// No server exists with the given identifier.
    #[error("license server {0} not found")]
    NotFound(ServerId),

    /// Another server already uses the vendor name.
    #[error("vendor {0} is already registered")]
    DuplicateVendor(VendorName),

    /// The usage database is unset, unreadable or too slow.
    #[error("usage database unavailable: {reason}")]
    SourceUnavailable {
        /// Failure description.
        reason: String,
    },

    /// The license manager did not answer in time.
    #[error("license manager {address} timed out")]
    UpstreamTimeout {
        /// Queried `port@host` path.
        address: String,
    },

    /// The license manager query failed.
    #[error(transparent)]
    UpstreamError(LicenseStatusError),

    /// The store refused a commit whose delta no longer matches.
    #[error("commit for license server {server_id} refused: {reason}")]
    PartialCommitRefused {
        /// Server whose commit was refused.
        server_id: ServerId,
        /// Mismatch description.
        reason: String,
    },

    /// Any other persistence failure.
    #[error(transparent)]
    Repository(LicenseServerRepositoryError),
}

impl LicenseMonitorServiceError {
    /// Creates a [`Self::SourceUnavailable`] error.
    #[must_use]
    pub fn source_unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            reason: reason.into(),
        }
    }
}

impl From<LicenseServerRepositoryError> for LicenseMonitorServiceError {
    fn from(err: LicenseServerRepositoryError) -> Self {
        match err {
            LicenseServerRepositoryError::NotFound(server_id) => Self::NotFound(server_id),
            LicenseServerRepositoryError::DuplicateVendor(vendor) => Self::DuplicateVendor(vendor),
            LicenseServerRepositoryError::PartialCommitRefused { server_id, reason } => {
                Self::PartialCommitRefused { server_id, reason }
            }
            other => Self::Repository(other),
        }
    }
}

impl From<SampleStoreError> for LicenseMonitorServiceError {
    fn from(err: SampleStoreError) -> Self {
        Self::source_unavailable(err.to_string())
    }
}

impl From<LicenseStatusError> for LicenseMonitorServiceError {
    fn from(err: LicenseStatusError) -> Self {
        match err {
            LicenseStatusError::Timeout { address } => Self::UpstreamTimeout { address },
            upstream @ LicenseStatusError::Upstream { .. } => Self::UpstreamError(upstream),
        }
    }
}
