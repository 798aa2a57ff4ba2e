//! In-memory live status adapter with failure and latency injection.

use crate::license_server::{
    domain::{CheckoutRecord, FeatureName, ServerAddress},
    ports::{LicenseStatusError, LicenseStatusQuery, LicenseStatusResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// In-memory license manager keyed by `port@host`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLicenseStatus {
    state: Arc<RwLock<InMemoryStatusState>>,
}

#[derive(Debug, Default)]
struct InMemoryStatusState {
    checkouts: HashMap<String, Vec<CheckoutRecord>>,
    failures: HashMap<String, LicenseStatusError>,
    latencies: HashMap<String, Duration>,
}

fn lock_error(address: &ServerAddress, err: impl std::fmt::Display) -> LicenseStatusError {
    LicenseStatusError::upstream(address, err.to_string())
}

impl InMemoryLicenseStatus {
    /// Creates a license manager with no checkouts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the checkouts reported for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseStatusError::Upstream`] when lock acquisition fails.
    pub fn set_checkouts(
        &self,
        address: &ServerAddress,
        records: Vec<CheckoutRecord>,
    ) -> LicenseStatusResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(address, err))?;
        state.checkouts.insert(address.license_path(), records);
        Ok(())
    }

    /// Makes every query for `address` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseStatusError::Upstream`] when lock acquisition fails.
    pub fn set_failure(
        &self,
        address: &ServerAddress,
        error: LicenseStatusError,
    ) -> LicenseStatusResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(address, err))?;
        state.failures.insert(address.license_path(), error);
        Ok(())
    }

    /// Delays every answer for `address` by `latency`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseStatusError::Upstream`] when lock acquisition fails.
    pub fn set_latency(
        &self,
        address: &ServerAddress,
        latency: Duration,
    ) -> LicenseStatusResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(address, err))?;
        state.latencies.insert(address.license_path(), latency);
        Ok(())
    }
}

#[async_trait]
impl LicenseStatusQuery for InMemoryLicenseStatus {
    async fn query(
        &self,
        address: &ServerAddress,
        feature: Option<&FeatureName>,
    ) -> LicenseStatusResult<Vec<CheckoutRecord>> {
        let license_path = address.license_path();
        let latency = self
            .state
            .read()
            .map_err(|err| lock_error(address, err))?
            .latencies
            .get(&license_path)
            .copied();
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().map_err(|err| lock_error(address, err))?;
        if let Some(failure) = state.failures.get(&license_path) {
            return Err(failure.clone());
        }

        Ok(state
            .checkouts
            .get(&license_path)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| {
                        feature.is_none_or(|wanted| record.feature == wanted.as_str())
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
