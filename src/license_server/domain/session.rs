//! States of a server configuration session.

use super::{CatalogForm, LicenseServer, SubscriptionDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a configuration session stands after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSessionState {
    /// The server has no usage database, so there is nothing to subscribe to.
    NoDatabase,
    /// The column form must be presented (again) before anything is committed.
    CatalogPresented,
    /// The submission was committed and the session is over.
    Reconciled,
}

impl ConfigSessionState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoDatabase => "no_database",
            Self::CatalogPresented => "catalog_presented",
            Self::Reconciled => "reconciled",
        }
    }
}

impl fmt::Display for ConfigSessionState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Outcome of a configuration operation: the next state and its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigStep {
    /// No usage database is configured.
    NoDatabase {
        /// Current server record.
        server: LicenseServer,
    },
    /// The column selection form to render.
    CatalogPresented {
        /// Current server record.
        server: LicenseServer,
        /// Catalog and checkbox states.
        form: CatalogForm,
    },
    /// The submission has been committed.
    Reconciled {
        /// Server record as committed.
        server: LicenseServer,
        /// Subscription delta that was applied.
        delta: SubscriptionDelta,
    },
}

impl ConfigStep {
    /// Returns the session state this step represents.
    #[must_use]
    pub const fn state(&self) -> ConfigSessionState {
        match self {
            Self::NoDatabase { .. } => ConfigSessionState::NoDatabase,
            Self::CatalogPresented { .. } => ConfigSessionState::CatalogPresented,
            Self::Reconciled { .. } => ConfigSessionState::Reconciled,
        }
    }

    /// Returns the server record carried by the step.
    #[must_use]
    pub const fn server(&self) -> &LicenseServer {
        match self {
            Self::NoDatabase { server }
            | Self::CatalogPresented { server, .. }
            | Self::Reconciled { server, .. } => server,
        }
    }

    /// Returns the catalog form when one must be presented.
    #[must_use]
    pub const fn form(&self) -> Option<&CatalogForm> {
        match self {
            Self::CatalogPresented { form, .. } => Some(form),
            Self::NoDatabase { .. } | Self::Reconciled { .. } => None,
        }
    }
}
