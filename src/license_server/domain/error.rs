//! Error types for license server domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing license server domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LicenseServerDomainError {
    /// The vendor name is empty after trimming.
    #[error("vendor name must not be empty")]
    EmptyVendorName,

    /// The vendor name exceeds the 50-character storage limit.
    #[error("vendor name exceeds 50 character limit: {0}")]
    VendorNameTooLong(String),

    /// The license server host is empty after trimming.
    #[error("license server host must not be empty")]
    EmptyHost,

    /// The license server host exceeds the 64-character storage limit.
    #[error("license server host exceeds 64 character limit: {0}")]
    HostTooLong(String),

    /// The host contains whitespace or the `@` separator.
    #[error("license server host '{0}' contains invalid characters")]
    InvalidHost(String),

    /// Port zero cannot be queried.
    #[error("license server port must be between 1 and 65535")]
    InvalidPort,

    /// The monitored feature name exceeds the 50-character storage limit.
    #[error("feature name exceeds 50 character limit: {0}")]
    FeatureNameTooLong(String),

    /// The usage database path exceeds the 255-character storage limit.
    #[error("usage database path exceeds 255 character limit: {0}")]
    UsageDatabasePathTooLong(String),

    /// A column name is empty after trimming.
    #[error("column name must not be empty")]
    EmptyColumnName,

    /// A column name exceeds the 50-character storage limit.
    #[error("column name exceeds 50 character limit: {0}")]
    ColumnNameTooLong(String),
}

/// Error returned when a usage period token is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown usage period: {0}")]
pub struct ParseUsagePeriodError(pub String);
