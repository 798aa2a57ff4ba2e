//! Repository port for license server records and their subscriptions.

use crate::license_server::domain::{
    ColumnName, LicenseServer, ServerCommit, ServerId, VendorName,
};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for license server repository operations.
pub type LicenseServerRepositoryResult<T> = Result<T, LicenseServerRepositoryError>;

/// Transactional persistence contract for servers and subscribed columns.
#[async_trait]
pub trait LicenseServerRepository: Send + Sync {
    /// Stores a new server with no subscriptions.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseServerRepositoryError::DuplicateServer`] when the ID
    /// already exists or [`LicenseServerRepositoryError::DuplicateVendor`]
    /// when the vendor name is taken.
    async fn create(&self, server: &LicenseServer) -> LicenseServerRepositoryResult<()>;

    /// Finds a server by identifier.
    async fn find_by_id(
        &self,
        server_id: ServerId,
    ) -> LicenseServerRepositoryResult<Option<LicenseServer>>;

    /// Finds a server by its unique vendor name.
    async fn find_by_vendor(
        &self,
        vendor: &VendorName,
    ) -> LicenseServerRepositoryResult<Option<LicenseServer>>;

    /// Returns every server ordered by vendor name.
    async fn list_all(&self) -> LicenseServerRepositoryResult<Vec<LicenseServer>>;

    /// Returns the columns a server subscribes to.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseServerRepositoryError::NotFound`] when the server does
    /// not exist.
    async fn subscribed_columns(
        &self,
        server_id: ServerId,
    ) -> LicenseServerRepositoryResult<BTreeSet<ColumnName>>;

    /// Applies a server update and its subscription change in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseServerRepositoryError::NotFound`] for an unknown
    /// server, [`LicenseServerRepositoryError::DuplicateVendor`] when a rename
    /// collides, and [`LicenseServerRepositoryError::PartialCommitRefused`]
    /// when the subscription delta no longer matches the stored set. Nothing
    /// is written on error.
    async fn commit(&self, commit: &ServerCommit) -> LicenseServerRepositoryResult<()>;

    /// Deletes a server and all of its subscriptions in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseServerRepositoryError::NotFound`] when the server does
    /// not exist.
    async fn delete(&self, server_id: ServerId) -> LicenseServerRepositoryResult<()>;
}

/// Errors returned by license server repository implementations.
#[derive(Debug, Clone, Error)]
pub enum LicenseServerRepositoryError {
    /// A server with the same identifier already exists.
    #[error("duplicate license server identifier: {0}")]
    DuplicateServer(ServerId),

    /// A server with the same vendor name already exists.
    #[error("vendor name already used: {0}")]
    DuplicateVendor(VendorName),

    /// The server was not found.
    #[error("license server not found: {0}")]
    NotFound(ServerId),

    /// The commit would only partly apply and was rejected as a whole.
    #[error("commit for license server {server_id} refused: {reason}")]
    PartialCommitRefused {
        /// Server identifier.
        server_id: ServerId,
        /// Why the commit could not apply in full.
        reason: String,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted license server data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LicenseServerRepositoryError {
    /// Creates a partial-commit refusal.
    #[must_use]
    pub fn partial_commit_refused(server_id: ServerId, reason: impl Into<String>) -> Self {
        Self::PartialCommitRefused {
            server_id,
            reason: reason.into(),
        }
    }

    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
