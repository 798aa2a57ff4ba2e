//! Domain model for license servers, column subscriptions and usage data.
//!
//! The domain covers server identity and settings, the checkbox
//! reconciliation rules for subscribed columns, usage periods and rows, and
//! live checkout records. Infrastructure concerns remain outside this
//! boundary.

mod address;
mod checkout;
mod commit;
mod error;
mod ids;
mod period;
mod series;
mod server;
mod session;
mod subscription;

pub use address::{ServerAddress, UsageDatabasePath};
pub use checkout::{CheckoutRecord, LiveUsers};
pub use commit::{ServerCommit, SubscriptionChange};
pub use error::{LicenseServerDomainError, ParseUsagePeriodError};
pub use ids::{ColumnName, FeatureName, ServerId, VendorName};
pub use period::UsagePeriod;
pub use series::{ChartSeries, TimeSeriesRow, chart_series};
pub use server::{LicenseServer, PersistedLicenseServerData, ServerConfigInput, ServerSettings};
pub use session::{ConfigSessionState, ConfigStep};
pub use subscription::{CatalogForm, ColumnSelections, SubscriptionDelta, reconcile};
