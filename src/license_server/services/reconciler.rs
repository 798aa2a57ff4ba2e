//! Applies checkbox submissions to a server's subscriptions.

use super::error::LicenseMonitorServiceResult;
use crate::license_server::{
    domain::{
        ColumnName, ColumnSelections, LicenseServer, ServerCommit, SubscriptionChange,
        SubscriptionDelta, reconcile,
    },
    ports::LicenseServerRepository,
};
use std::sync::Arc;
use tracing::info;

/// Turns a submission into a delta and commits it with the server fields.
pub struct SubscriptionReconciler<R>
where
    R: LicenseServerRepository,
{
    repository: Arc<R>,
}

impl<R> SubscriptionReconciler<R>
where
    R: LicenseServerRepository,
{
    /// Creates a reconciler over `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Reconciles `selections` against the stored subscriptions of `server`
    /// and commits the result together with the server's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown server, `DuplicateVendor` for a
    /// rename clash, `PartialCommitRefused` when the stored set changed under
    /// the delta, or other repository failures.
    pub async fn apply(
        &self,
        server: &LicenseServer,
        catalog: &[ColumnName],
        selections: &ColumnSelections,
    ) -> LicenseMonitorServiceResult<SubscriptionDelta> {
        let current = self.repository.subscribed_columns(server.id()).await?;
        let delta = reconcile(catalog, selections, &current);
        let change = if delta.is_empty() {
            SubscriptionChange::Unchanged
        } else {
            SubscriptionChange::Apply(delta.clone())
        };

        self.repository
            .commit(&ServerCommit::new(server.clone(), change))
            .await?;
        info!(
            server_id = %server.id(),
            vendor = %server.vendor(),
            added = delta.to_add.len(),
            removed = delta.to_remove.len(),
            "reconciled column subscriptions"
        );
        Ok(delta)
    }
}
