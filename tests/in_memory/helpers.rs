//! Shared test helpers for in-memory integration tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use licensewatch::license_server::{
    adapters::memory::{InMemoryLicenseServerRepository, InMemoryLicenseStatus, InMemorySampleStore},
    domain::ServerConfigInput,
    services::{ServerConfigService, ServiceTimeouts},
};
use mockable::Clock;
use rstest::fixture;
use std::sync::Arc;

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Service wired to in-memory adapters.
pub type InMemoryService = ServerConfigService<
    InMemoryLicenseServerRepository,
    InMemorySampleStore,
    InMemoryLicenseStatus,
    FixedClock,
>;

/// Adapters and the service built over them.
pub struct TestContext {
    /// Shared repository.
    pub repository: Arc<InMemoryLicenseServerRepository>,
    /// Shared usage databases.
    pub store: Arc<InMemorySampleStore>,
    /// Shared license manager.
    pub status: Arc<InMemoryLicenseStatus>,
    /// Service under test.
    pub service: InMemoryService,
}

/// Instant the fixed clock reports.
///
/// # Panics
///
/// Panics if the constant date is invalid.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0)
        .single()
        .expect("valid test instant")
}

/// Provides fresh adapters and a service for each test.
#[fixture]
pub fn context() -> TestContext {
    let repository = Arc::new(InMemoryLicenseServerRepository::new());
    let store = Arc::new(InMemorySampleStore::new());
    let status = Arc::new(InMemoryLicenseStatus::new());
    let service = ServerConfigService::new(
        Arc::clone(&repository),
        Arc::clone(&store),
        Arc::clone(&status),
        Arc::new(FixedClock(now())),
        ServiceTimeouts::default(),
    );
    TestContext {
        repository,
        store,
        status,
        service,
    }
}

/// Form input for the Acme server on `path`.
#[must_use]
pub fn acme(path: &str) -> ServerConfigInput {
    ServerConfigInput::new("Acme", "licsrv01", 27000)
        .with_feature("MATLAB")
        .with_usage_database(path)
}
