//! Licensewatch: FlexLM license server usage monitoring.
//!
//! This crate tracks license servers, lets operators choose which columns of
//! each server's round-robin usage database to follow, and serves usage
//! history and live checkouts for those servers.
//!
//! # Architecture
//!
//! Licensewatch follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, CLI tools)
//!
//! # Modules
//!
//! - [`license_server`]: Server configuration, subscriptions and usage reads
//! - [`config`]: Monitor configuration loaded from JSON
//!
//! # Example
//!
//! ```
//! use licensewatch::license_server::{
//!     adapters::memory::{
//!         InMemoryLicenseServerRepository, InMemoryLicenseStatus, InMemorySampleStore,
//!     },
//!     domain::{ConfigSessionState, ServerConfigInput},
//!     services::{ServerConfigService, ServiceTimeouts},
//! };
//! use mockable::DefaultClock;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime builds").block_on(async {
//! let store = Arc::new(InMemorySampleStore::new());
//! store.put_database("/data/acme.rrd", &["cpu", "seats"]).expect("database installs");
//!
//! let service = ServerConfigService::new(
//!     Arc::new(InMemoryLicenseServerRepository::new()),
//!     store,
//!     Arc::new(InMemoryLicenseStatus::new()),
//!     Arc::new(DefaultClock),
//!     ServiceTimeouts::default(),
//! );
//! let input = ServerConfigInput::new("Acme", "licsrv01", 27000)
//!     .with_usage_database("/data/acme.rrd");
//! let step = service.create_server(&input).await.expect("server registers");
//! assert_eq!(step.state(), ConfigSessionState::CatalogPresented);
//! # });
//! ```

pub mod config;
pub mod license_server;
