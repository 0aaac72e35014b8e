//! Differ - Compare desired state with current state
//!
//! Compares the "desired state" declared in DSL with the last observed state
//! fetched from the Provider, and reports which attributes changed.

use std::collections::HashMap;

use crate::resource::{Resource, State, Value};

/// Find changed attributes between desired and current state
///
/// Only attributes present in `desired` are considered; attributes starting
/// with `_` are internal and skipped.
pub fn changed_attributes(desired: &Resource, current: &State) -> Vec<String> {
    let mut changed: Vec<String> = desired
        .attributes
        .iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .filter(|(key, value)| !values_equal(value, current.attributes.get(key.as_str())))
        .map(|(key, _)| key.clone())
        .collect();
    changed.sort();
    changed
}

/// Whether `desired_key` of the desired resource differs from `current_key` of
/// the current state
///
/// The keys differ when a legacy input attribute is observed under its
/// canonical name. An attribute absent from the desired resource is never a
/// change.
pub fn attribute_changed(
    desired: &HashMap<String, Value>,
    desired_key: &str,
    current: &HashMap<String, Value>,
    current_key: &str,
) -> bool {
    match desired.get(desired_key) {
        Some(value) => !values_equal(value, current.get(current_key)),
        None => false,
    }
}

/// Whether an attribute changed, observed under the same name
pub fn has_change(desired: &Resource, current: &State, key: &str) -> bool {
    attribute_changed(&desired.attributes, key, &current.attributes, key)
}

/// Lists compare as sets; the remote side does not keep their order
fn values_equal(desired: &Value, current: Option<&Value>) -> bool {
    match (desired, current) {
        (Value::List(a), Some(Value::List(b))) => {
            a.len() == b.len() && a.iter().all(|item| b.contains(item))
        }
        (a, Some(b)) => a == b,
        (_, None) => false,
    }
}
