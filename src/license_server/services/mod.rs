//! Application services for license server configuration and monitoring.

mod catalog;
mod error;
mod locks;
mod reader;
mod reconciler;
mod server_config;
mod timeouts;

pub use catalog::ColumnCatalog;
pub use error::{LicenseMonitorServiceError, LicenseMonitorServiceResult};
pub use locks::ServerLocks;
pub use reader::TimeSeriesReader;
pub use reconciler::SubscriptionReconciler;
pub use server_config::{ServerConfigService, ServerOverview};
pub use timeouts::{DEFAULT_STATUS_TIMEOUT, DEFAULT_STORE_TIMEOUT, ServiceTimeouts};
