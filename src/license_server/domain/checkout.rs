//! Live license checkout records reported by a license manager.

use super::{ServerAddress, VendorName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One seat currently checked out from a license manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRecord {
    /// User holding the seat.
    pub user: String,
    /// Host the seat was checked out from.
    pub host: String,
    /// Display or terminal name, when reported.
    pub display: Option<String>,
    /// Feature the seat belongs to.
    pub feature: String,
    /// Feature version, when reported.
    pub version: Option<String>,
    /// Checkout start as printed by the license manager (it carries no year).
    pub checked_out_since: String,
    /// Number of seats held by this checkout.
    pub licenses: u32,
}

/// Snapshot of the checkouts on one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveUsers {
    /// Vendor name of the server.
    pub vendor: VendorName,
    /// Address that was queried.
    pub address: ServerAddress,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
    /// Current checkouts.
    pub records: Vec<CheckoutRecord>,
}
