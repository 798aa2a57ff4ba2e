//! Diesel row models for license server persistence.

use super::schema::{license_servers, subscribed_columns};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for license server records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = license_servers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LicenseServerRow {
    /// Internal server identifier.
    pub id: uuid::Uuid,
    /// Unique vendor name.
    pub vendor: String,
    /// License manager host.
    pub host: String,
    /// License manager port.
    pub port: i32,
    /// Optional monitored feature.
    pub feature: Option<String>,
    /// Optional usage database path.
    pub usage_database: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for license server records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = license_servers)]
pub struct NewLicenseServerRow {
    /// Internal server identifier.
    pub id: uuid::Uuid,
    /// Unique vendor name.
    pub vendor: String,
    /// License manager host.
    pub host: String,
    /// License manager port.
    pub port: i32,
    /// Optional monitored feature.
    pub feature: Option<String>,
    /// Optional usage database path.
    pub usage_database: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for subscribed columns.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscribed_columns)]
pub struct NewSubscribedColumnRow {
    /// Owning server.
    pub server_id: uuid::Uuid,
    /// Subscribed column name.
    pub column_name: String,
}
