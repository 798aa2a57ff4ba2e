//! `PostgreSQL` adapters for license server persistence.

mod models;
mod repository;
mod schema;

pub use repository::{LicenseServerPgPool, PostgresLicenseServerRepository};
