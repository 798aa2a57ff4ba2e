//! Identifier and validated-name types for license servers.

use super::LicenseServerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length for a vendor name, matching `VARCHAR(50)`.
const MAX_VENDOR_NAME_LENGTH: usize = 50;

/// Maximum length for a column name, matching `VARCHAR(50)`.
const MAX_COLUMN_NAME_LENGTH: usize = 50;

/// Maximum length for a feature name, matching `VARCHAR(50)`.
const MAX_FEATURE_NAME_LENGTH: usize = 50;

/// Unique identifier for a tracked license server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(Uuid);

impl ServerId {
    /// Creates a new random server identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a server identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ServerId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for ServerId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated vendor name, the operator-facing unique key of a server.
///
/// Vendor names are trimmed but otherwise kept as typed; lookups are exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorName(String);

impl VendorName {
    /// Creates a validated vendor name.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseServerDomainError`] when the trimmed value is empty or
    /// longer than 50 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, LicenseServerDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(LicenseServerDomainError::EmptyVendorName);
        }

        if normalized.chars().count() > MAX_VENDOR_NAME_LENGTH {
            return Err(LicenseServerDomainError::VendorNameTooLong(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the vendor name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VendorName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for VendorName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Name of a metric column inside a usage database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnName(String);

impl ColumnName {
    /// Creates a validated column name.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseServerDomainError`] when the trimmed value is empty or
    /// longer than 50 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, LicenseServerDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(LicenseServerDomainError::EmptyColumnName);
        }

        if normalized.chars().count() > MAX_COLUMN_NAME_LENGTH {
            return Err(LicenseServerDomainError::ColumnNameTooLong(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the column name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Licensed feature whose checkouts are reported for a server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureName(String);

impl FeatureName {
    /// Parses an optional feature name.
    ///
    /// Blank input means "no feature filter" and yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseServerDomainError::FeatureNameTooLong`] when the
    /// trimmed value exceeds 50 characters.
    pub fn parse_optional(
        value: impl Into<String>,
    ) -> Result<Option<Self>, LicenseServerDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Ok(None);
        }
        if normalized.chars().count() > MAX_FEATURE_NAME_LENGTH {
            return Err(LicenseServerDomainError::FeatureNameTooLong(normalized));
        }
        Ok(Some(Self(normalized)))
    }

    /// Returns the feature name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
