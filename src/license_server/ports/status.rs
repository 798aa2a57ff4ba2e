//! Port for querying live checkouts from a license manager.

use crate::license_server::domain::{CheckoutRecord, FeatureName, ServerAddress};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for live status queries.
pub type LicenseStatusResult<T> = Result<T, LicenseStatusError>;

/// Live checkout query against a license manager.
///
/// Implementations report failures and never retry on their own.
#[async_trait]
pub trait LicenseStatusQuery: Send + Sync {
    /// Returns current checkouts, restricted to `feature` when given.
    async fn query(
        &self,
        address: &ServerAddress,
        feature: Option<&FeatureName>,
    ) -> LicenseStatusResult<Vec<CheckoutRecord>>;
}

/// Errors returned by live status adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LicenseStatusError {
    /// The license manager did not answer in time.
    #[error("license manager {address} timed out")]
    Timeout {
        /// Queried `port@host` path.
        address: String,
    },

    /// The license manager or its client tool failed.
    #[error("license manager {address} query failed: {reason}")]
    Upstream {
        /// Queried `port@host` path.
        address: String,
        /// Failure description.
        reason: String,
    },
}

impl LicenseStatusError {
    /// Creates an upstream failure for `address`.
    #[must_use]
    pub fn upstream(address: &ServerAddress, reason: impl Into<String>) -> Self {
        Self::Upstream {
            address: address.license_path(),
            reason: reason.into(),
        }
    }

    /// Creates a timeout for `address`.
    #[must_use]
    pub fn timeout(address: &ServerAddress) -> Self {
        Self::Timeout {
            address: address.license_path(),
        }
    }
}
