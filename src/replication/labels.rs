//! Labels stamped on replicated secrets.
//!
//! Replicas carry no forward index: the labels written here are the only
//! record of which source secret a replica was copied from, and discovery
//! walks them with a label selector.

use std::collections::BTreeMap;

use crate::store::LabelSelector;

/// Label marking a secret as managed by certsync.
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/name";

/// Value of [`MANAGED_BY_LABEL`] on every replica.
pub const MANAGED_BY_VALUE: &str = "certsync";

/// Label carrying the name of the source secret a replica was copied from.
pub const SOURCE_NAME_LABEL: &str = "certsync/source-name";

/// The labels a freshly created replica carries.
pub fn replica_labels(source_name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());
    labels.insert(SOURCE_NAME_LABEL.to_string(), source_name.to_string());
    labels
}

/// Selector matching every replica of the named source secret.
pub fn replica_selector(source_name: &str) -> LabelSelector {
    LabelSelector::new()
        .equals(MANAGED_BY_LABEL, MANAGED_BY_VALUE)
        .equals(SOURCE_NAME_LABEL, source_name)
}
