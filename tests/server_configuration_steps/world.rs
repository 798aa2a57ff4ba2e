//! Shared world state for license server configuration BDD scenarios.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use licensewatch::license_server::{
    adapters::memory::{InMemoryLicenseServerRepository, InMemoryLicenseStatus, InMemorySampleStore},
    domain::{ColumnSelections, ConfigStep, ServerConfigInput, ServerId},
    services::{LicenseMonitorServiceError, ServerConfigService, ServiceTimeouts},
};
use mockable::Clock;
use rstest::fixture;

/// Clock frozen at the scenario instant.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioClock(pub DateTime<Utc>);

impl Clock for ScenarioClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Service type used by the BDD world.
pub type TestConfigService = ServerConfigService<
    InMemoryLicenseServerRepository,
    InMemorySampleStore,
    InMemoryLicenseStatus,
    ScenarioClock,
>;

/// Scenario world for configuration behaviour tests.
pub struct ConfigWorld {
    /// Usage databases visible to the service.
    pub store: Arc<InMemorySampleStore>,
    /// The configuration service under test.
    pub service: TestConfigService,
    /// Server registered by the scenario.
    pub server_id: Option<ServerId>,
    /// Step returned by the last successful submission.
    pub last_step: Option<ConfigStep>,
    /// Error returned by the last failed submission.
    pub last_error: Option<LicenseMonitorServiceError>,
}

impl ConfigWorld {
    /// Creates a world with empty adapters.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemorySampleStore::new());
        let service = ServerConfigService::new(
            Arc::new(InMemoryLicenseServerRepository::new()),
            Arc::clone(&store),
            Arc::new(InMemoryLicenseStatus::new()),
            Arc::new(ScenarioClock(scenario_now())),
            ServiceTimeouts::default(),
        );
        Self {
            store,
            service,
            server_id: None,
            last_step: None,
            last_error: None,
        }
    }

    /// Returns the scenario's server.
    pub fn server_id(&self) -> Result<ServerId, eyre::Report> {
        self.server_id
            .ok_or_else(|| eyre::eyre!("scenario server should be registered"))
    }
}

/// Fixed instant every scenario runs at.
#[must_use]
pub fn scenario_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[fixture]
pub fn world() -> ConfigWorld {
    ConfigWorld::new()
}

/// Runs a future on the scenario's runtime.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Splits a comma separated column list.
#[must_use]
pub fn column_list(columns: &str) -> Vec<&str> {
    columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .collect()
}

/// Builds Acme's form input for `vendor` pointing at `path`.
#[must_use]
pub fn form_input(vendor: &str, path: &str) -> ServerConfigInput {
    ServerConfigInput::new(vendor, "licsrv01", 27000).with_usage_database(path)
}

/// Ticks every column in `columns`.
#[must_use]
pub fn ticked(columns: &str) -> ColumnSelections {
    column_list(columns)
        .into_iter()
        .map(|column| (column, true))
        .collect()
}
