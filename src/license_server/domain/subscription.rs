//! Column subscriptions and the checkbox reconciliation rules.
//!
//! A server subscribes to the usage database columns whose history should be
//! surfaced. Operators edit the subscription through one checkbox per catalog
//! column; [`reconcile`] turns a submission into the minimal add/remove delta
//! against what is stored.

use super::ColumnName;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Checkbox states submitted for catalog columns, keyed by column name.
///
/// A column missing from the map counts as unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSelections(BTreeMap<String, bool>);

impl ColumnSelections {
    /// Creates an empty selection set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Records the state of one checkbox.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, checked: bool) -> Self {
        self.0.insert(column.into().trim().to_owned(), checked);
        self
    }

    /// Returns whether the checkbox for `column` was ticked.
    #[must_use]
    pub fn is_checked(&self, column: &ColumnName) -> bool {
        self.0.get(column.as_str()).copied().unwrap_or(false)
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for ColumnSelections {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |selections, (column, checked)| {
                selections.with(column, checked)
            })
    }
}

/// Minimal change to a server's subscribed-column set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubscriptionDelta {
    /// Columns to subscribe.
    pub to_add: BTreeSet<ColumnName>,
    /// Columns to unsubscribe.
    pub to_remove: BTreeSet<ColumnName>,
}

impl SubscriptionDelta {
    /// Returns whether the delta changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Returns whether the delta can be applied to `current` exactly.
    ///
    /// Every removal must be subscribed, no addition may be, and no column
    /// may appear on both sides.
    #[must_use]
    pub fn applies_cleanly_to(&self, current: &BTreeSet<ColumnName>) -> bool {
        self.to_add.is_disjoint(&self.to_remove)
            && self.to_add.is_disjoint(current)
            && self.to_remove.is_subset(current)
    }

    /// Returns `current` with the delta applied.
    #[must_use]
    pub fn applied_to(&self, current: &BTreeSet<ColumnName>) -> BTreeSet<ColumnName> {
        current
            .difference(&self.to_remove)
            .chain(self.to_add.iter())
            .cloned()
            .collect()
    }
}

/// Computes the subscription delta for one checkbox submission.
///
/// Only catalog columns are considered. Subscribed columns missing from the
/// catalog are left alone; they are purged only when the usage database path
/// changes.
#[must_use]
pub fn reconcile(
    catalog: &[ColumnName],
    selections: &ColumnSelections,
    current: &BTreeSet<ColumnName>,
) -> SubscriptionDelta {
    catalog
        .iter()
        .fold(SubscriptionDelta::default(), |mut delta, column| {
            match (current.contains(column), selections.is_checked(column)) {
                (false, true) => {
                    delta.to_add.insert(column.clone());
                }
                (true, false) => {
                    delta.to_remove.insert(column.clone());
                }
                (false, false) | (true, true) => {}
            }
            delta
        })
}

/// Data needed to render the column selection form of one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogForm {
    /// Columns currently present in the usage database, in store order.
    pub catalog: Vec<ColumnName>,
    /// Checkbox state per catalog column.
    pub selections: BTreeMap<ColumnName, bool>,
}

impl CatalogForm {
    /// Builds the form for `catalog`, ticking every subscribed column.
    #[must_use]
    pub fn new(catalog: Vec<ColumnName>, subscribed: &BTreeSet<ColumnName>) -> Self {
        let selections = catalog
            .iter()
            .map(|column| (column.clone(), subscribed.contains(column)))
            .collect();
        Self {
            catalog,
            selections,
        }
    }
}
