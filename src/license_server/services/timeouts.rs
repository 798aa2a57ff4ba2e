//! Time limits applied to usage database and license manager calls.

use super::error::{LicenseMonitorServiceError, LicenseMonitorServiceResult};
use crate::license_server::{domain::UsageDatabasePath, ports::SampleStoreResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default limit for one usage database call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default limit for one license manager query.
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Time limits for outbound calls made by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTimeouts {
    /// Limit for opening and reading a usage database.
    pub store: Duration,
    /// Limit for a live license manager query.
    pub status: Duration,
}

impl ServiceTimeouts {
    /// Creates timeouts from explicit durations.
    #[must_use]
    pub const fn new(store: Duration, status: Duration) -> Self {
        Self { store, status }
    }
}

impl Default for ServiceTimeouts {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_TIMEOUT, DEFAULT_STATUS_TIMEOUT)
    }
}

/// Runs a store call under `limit`, turning failures and expiry into
/// [`LicenseMonitorServiceError::SourceUnavailable`].
pub(super) async fn bounded_store_call<T, F>(
    limit: Duration,
    path: &UsageDatabasePath,
    call: F,
) -> LicenseMonitorServiceResult<T>
where
    F: Future<Output = SampleStoreResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            warn!(path = %path, error = %err, "usage database unavailable");
            Err(err.into())
        }
        Err(_) => {
            warn!(path = %path, limit_ms = limit.as_millis(), "usage database call timed out");
            Err(LicenseMonitorServiceError::source_unavailable(format!(
                "usage database {path} did not answer within {}ms",
                limit.as_millis()
            )))
        }
    }
}
