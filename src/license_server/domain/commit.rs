//! Atomic unit of change for a server and its subscriptions.

use super::{LicenseServer, SubscriptionDelta};

/// How a commit changes the subscribed-column set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionChange {
    /// Leave subscriptions as they are.
    Unchanged,
    /// Apply an add/remove delta.
    Apply(SubscriptionDelta),
    /// Drop every subscription of the server.
    PurgeAll,
}

/// Server record update and subscription change committed together.
///
/// Repositories apply both halves in one transaction or neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommit {
    /// Server record with its new scalar fields.
    pub server: LicenseServer,
    /// Subscription change for the same server.
    pub subscriptions: SubscriptionChange,
}

impl ServerCommit {
    /// Creates a commit.
    #[must_use]
    pub const fn new(server: LicenseServer, subscriptions: SubscriptionChange) -> Self {
        Self {
            server,
            subscriptions,
        }
    }
}
