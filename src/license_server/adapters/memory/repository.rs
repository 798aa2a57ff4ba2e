//! In-memory repository for license servers and subscriptions.

use crate::license_server::{
    domain::{
        ColumnName, LicenseServer, ServerCommit, ServerId, SubscriptionChange, VendorName,
    },
    ports::{
        LicenseServerRepository, LicenseServerRepositoryError, LicenseServerRepositoryResult,
    },
};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory license server repository.
///
/// All state sits behind one lock, so a commit is applied entirely or not at
/// all.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLicenseServerRepository {
    state: Arc<RwLock<InMemoryRepositoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryRepositoryState {
    servers: HashMap<ServerId, LicenseServer>,
    vendor_index: HashMap<VendorName, ServerId>,
    subscriptions: HashMap<ServerId, BTreeSet<ColumnName>>,
}

impl InMemoryLicenseServerRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> LicenseServerRepositoryError {
    LicenseServerRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryRepositoryState {
    fn next_subscriptions(
        &self,
        server_id: ServerId,
        change: &SubscriptionChange,
    ) -> LicenseServerRepositoryResult<Option<BTreeSet<ColumnName>>> {
        let current = self.subscriptions.get(&server_id);
        match change {
            SubscriptionChange::Unchanged => Ok(None),
            SubscriptionChange::PurgeAll => Ok(Some(BTreeSet::new())),
            SubscriptionChange::Apply(delta) => {
                let empty = BTreeSet::new();
                let stored = current.unwrap_or(&empty);
                if !delta.applies_cleanly_to(stored) {
                    return Err(LicenseServerRepositoryError::partial_commit_refused(
                        server_id,
                        "subscription delta does not match stored columns",
                    ));
                }
                Ok(Some(delta.applied_to(stored)))
            }
        }
    }
}

#[async_trait]
impl LicenseServerRepository for InMemoryLicenseServerRepository {
    async fn create(&self, server: &LicenseServer) -> LicenseServerRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if state.servers.contains_key(&server.id()) {
            return Err(LicenseServerRepositoryError::DuplicateServer(server.id()));
        }

        if state.vendor_index.contains_key(server.vendor()) {
            return Err(LicenseServerRepositoryError::DuplicateVendor(
                server.vendor().clone(),
            ));
        }

        state
            .vendor_index
            .insert(server.vendor().clone(), server.id());
        state.subscriptions.insert(server.id(), BTreeSet::new());
        state.servers.insert(server.id(), server.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        server_id: ServerId,
    ) -> LicenseServerRepositoryResult<Option<LicenseServer>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.servers.get(&server_id).cloned())
    }

    async fn find_by_vendor(
        &self,
        vendor: &VendorName,
    ) -> LicenseServerRepositoryResult<Option<LicenseServer>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .vendor_index
            .get(vendor)
            .and_then(|id| state.servers.get(id))
            .cloned())
    }

    async fn list_all(&self) -> LicenseServerRepositoryResult<Vec<LicenseServer>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut servers: Vec<LicenseServer> = state.servers.values().cloned().collect();
        servers.sort_by(|left, right| left.vendor().cmp(right.vendor()));
        Ok(servers)
    }

    async fn subscribed_columns(
        &self,
        server_id: ServerId,
    ) -> LicenseServerRepositoryResult<BTreeSet<ColumnName>> {
        let state = self.state.read().map_err(lock_error)?;
        if !state.servers.contains_key(&server_id) {
            return Err(LicenseServerRepositoryError::NotFound(server_id));
        }
        Ok(state
            .subscriptions
            .get(&server_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn commit(&self, commit: &ServerCommit) -> LicenseServerRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let server = &commit.server;

        let stored_vendor = state
            .servers
            .get(&server.id())
            .ok_or(LicenseServerRepositoryError::NotFound(server.id()))?
            .vendor()
            .clone();

        let renamed = *server.vendor() != stored_vendor;
        if renamed
            && let Some(&indexed_id) = state.vendor_index.get(server.vendor())
            && indexed_id != server.id()
        {
            return Err(LicenseServerRepositoryError::DuplicateVendor(
                server.vendor().clone(),
            ));
        }

        let next_subscriptions = state.next_subscriptions(server.id(), &commit.subscriptions)?;

        if renamed {
            state.vendor_index.remove(&stored_vendor);
            state
                .vendor_index
                .insert(server.vendor().clone(), server.id());
        }
        if let Some(columns) = next_subscriptions {
            state.subscriptions.insert(server.id(), columns);
        }
        state.servers.insert(server.id(), server.clone());
        Ok(())
    }

    async fn delete(&self, server_id: ServerId) -> LicenseServerRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let server = state
            .servers
            .remove(&server_id)
            .ok_or(LicenseServerRepositoryError::NotFound(server_id))?;
        state.vendor_index.remove(server.vendor());
        state.subscriptions.remove(&server_id);
        Ok(())
    }
}
