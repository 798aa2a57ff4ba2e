//! License server aggregate root and its editable settings.

use super::{
    FeatureName, LicenseServerDomainError, ServerAddress, ServerId, UsageDatabasePath, VendorName,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Raw scalar fields submitted by an operator for one server.
///
/// Blank `feature` and `usage_database` values mean "not configured".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerConfigInput {
    /// Vendor name, unique across servers.
    pub vendor: String,
    /// License manager host.
    pub host: String,
    /// License manager port.
    pub port: u16,
    /// Feature to report checkouts for.
    pub feature: String,
    /// Path to the round-robin usage database.
    pub usage_database: String,
}

impl ServerConfigInput {
    /// Creates an input with the required fields and no feature or database.
    #[must_use]
    pub fn new(vendor: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            vendor: vendor.into(),
            host: host.into(),
            port,
            feature: String::new(),
            usage_database: String::new(),
        }
    }

    /// Sets the monitored feature.
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = feature.into();
        self
    }

    /// Sets the usage database path.
    #[must_use]
    pub fn with_usage_database(mut self, path: impl Into<String>) -> Self {
        self.usage_database = path.into();
        self
    }
}

/// Validated scalar settings of a license server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Unique vendor name.
    pub vendor: VendorName,
    /// License manager address.
    pub address: ServerAddress,
    /// Optional monitored feature.
    pub feature: Option<FeatureName>,
    /// Optional usage database location.
    pub usage_database: Option<UsageDatabasePath>,
}

impl TryFrom<&ServerConfigInput> for ServerSettings {
    type Error = LicenseServerDomainError;

    fn try_from(input: &ServerConfigInput) -> Result<Self, Self::Error> {
        Ok(Self {
            vendor: VendorName::new(input.vendor.as_str())?,
            address: ServerAddress::new(input.host.as_str(), input.port)?,
            feature: FeatureName::parse_optional(input.feature.as_str())?,
            usage_database: UsageDatabasePath::parse_optional(input.usage_database.as_str())?,
        })
    }
}

/// A tracked license server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseServer {
    id: ServerId,
    vendor: VendorName,
    address: ServerAddress,
    feature: Option<FeatureName>,
    usage_database: Option<UsageDatabasePath>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing persisted server state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedLicenseServerData {
    /// Persisted server identifier.
    pub id: ServerId,
    /// Persisted settings.
    pub settings: ServerSettings,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl LicenseServer {
    /// Creates a new server record from validated settings.
    #[must_use]
    pub fn new(settings: ServerSettings, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ServerId::new(),
            vendor: settings.vendor,
            address: settings.address,
            feature: settings.feature,
            usage_database: settings.usage_database,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a server from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedLicenseServerData) -> Self {
        Self {
            id: data.id,
            vendor: data.settings.vendor,
            address: data.settings.address,
            feature: data.settings.feature,
            usage_database: data.settings.usage_database,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the server identifier.
    #[must_use]
    pub const fn id(&self) -> ServerId {
        self.id
    }

    /// Returns the vendor name.
    #[must_use]
    pub const fn vendor(&self) -> &VendorName {
        &self.vendor
    }

    /// Returns the license manager address.
    #[must_use]
    pub const fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// Returns the monitored feature, if any.
    #[must_use]
    pub const fn feature(&self) -> Option<&FeatureName> {
        self.feature.as_ref()
    }

    /// Returns the usage database path, if any.
    #[must_use]
    pub const fn usage_database(&self) -> Option<&UsageDatabasePath> {
        self.usage_database.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether `settings` points at a different usage database.
    #[must_use]
    pub fn usage_database_changes(&self, settings: &ServerSettings) -> bool {
        self.usage_database != settings.usage_database
    }

    /// Replaces every scalar field with `settings`.
    pub fn apply_settings(&mut self, settings: ServerSettings, clock: &impl Clock) {
        self.vendor = settings.vendor;
        self.address = settings.address;
        self.feature = settings.feature;
        self.usage_database = settings.usage_database;
        self.updated_at = clock.utc();
    }
}
