//! Request building
//!
//! Turns canonical desired fields into create and modify requests. Nothing
//! here talks to the control plane.

use carina_core::differ::attribute_changed;
use carina_core::resource::{Resource, State, Value};

use crate::client::{CreateReplicationGroupRequest, ModifyReplicationGroupRequest};
use crate::resolver::{
    AUTOMATIC_FAILOVER, DESCRIPTION, DesiredConfig, NODE_TYPE, Resolution, resolve_value,
};

pub const DEFAULT_PORT: i32 = 6379;
pub const DEFAULT_ENGINE: &str = "redis";

/// Build the create request for `desired`
///
/// Optional fields the user did not set stay unset so that the remote
/// defaults apply.
pub fn build_create(desired: &DesiredConfig) -> CreateReplicationGroupRequest {
    let port = desired
        .port
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_PORT);

    CreateReplicationGroupRequest {
        replication_group_id: desired.replication_group_id.clone(),
        description: desired.description.clone(),
        cache_node_type: desired.node_type.clone(),
        engine: desired
            .engine
            .clone()
            .unwrap_or_else(|| DEFAULT_ENGINE.to_string()),
        auto_minor_version_upgrade: desired.auto_minor_version_upgrade.unwrap_or(false),
        port,
        tags: desired.tags.clone(),
        engine_version: desired.engine_version.clone(),
        num_cache_clusters: desired.number_cache_clusters.filter(|n| *n != 0),
        automatic_failover_enabled: desired.automatic_failover_enabled,
        preferred_cache_cluster_azs: desired.availability_zones.clone(),
        cache_parameter_group_name: desired.parameter_group_name.clone(),
        cache_subnet_group_name: desired.subnet_group_name.clone(),
        cache_security_group_names: desired.security_group_names.clone(),
        security_group_ids: desired.security_group_ids.clone(),
        snapshot_arns: desired.snapshot_arns.clone(),
        snapshot_retention_limit: desired.snapshot_retention_limit,
        snapshot_window: desired.snapshot_window.clone(),
        snapshot_name: desired.snapshot_name.clone(),
        preferred_maintenance_window: desired.maintenance_window.clone(),
        notification_topic_arn: desired.notification_topic_arn.clone(),
    }
}

/// Tracks which desired attributes differ from the last observed state
struct Changes<'a> {
    to: &'a Resource,
    from: &'a State,
    requested: bool,
}

impl<'a> Changes<'a> {
    /// Whether `key` changed; legacy keys are observed under `observed_key`
    fn changed_as(&self, key: &str, observed_key: &str) -> bool {
        attribute_changed(
            &self.to.attributes,
            key,
            &self.from.attributes,
            observed_key,
        )
    }

    fn changed(&self, key: &str) -> bool {
        self.changed_as(key, key)
    }

    fn string(&self, key: &str) -> Option<String> {
        self.to.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.to.get(key).and_then(Value::as_bool)
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.to
            .get(key)
            .and_then(Value::as_string_list)
            .unwrap_or_default()
    }

    /// Canonical desired value of `resolution` when it differs from the
    /// value observed under the concept name
    fn resolved_if_changed(&self, resolution: &Resolution) -> Option<&'a Value> {
        let to: &'a Resource = self.to;
        let (key, value) = resolve_value(&to.attributes, resolution)?;
        self.changed_as(key, resolution.concept).then_some(value)
    }

    fn string_if_changed(&mut self, key: &str) -> Option<String> {
        let value = self
            .changed(key)
            .then(|| self.string(key))
            .flatten()
            .filter(|s| !s.is_empty());
        self.requested |= value.is_some();
        value
    }
}

/// Build the modify request for the attributes of `to` that changed since
/// `from` was observed
///
/// Returns `None` when nothing changed; the update then makes no remote
/// call at all.
pub fn build_modify(
    replication_group_id: &str,
    from: &State,
    to: &Resource,
) -> Option<ModifyReplicationGroupRequest> {
    let mut changes = Changes {
        to,
        from,
        requested: false,
    };
    let mut request = ModifyReplicationGroupRequest {
        replication_group_id: replication_group_id.to_string(),
        apply_immediately: changes.bool("apply_immediately").unwrap_or(false),
        ..Default::default()
    };

    request.description = changes
        .resolved_if_changed(&DESCRIPTION)
        .and_then(Value::as_str)
        .map(str::to_string);
    request.automatic_failover_enabled = changes
        .resolved_if_changed(&AUTOMATIC_FAILOVER)
        .and_then(Value::as_bool);
    request.cache_node_type = changes
        .resolved_if_changed(&NODE_TYPE)
        .and_then(Value::as_str)
        .map(str::to_string);
    changes.requested |= request.description.is_some()
        || request.automatic_failover_enabled.is_some()
        || request.cache_node_type.is_some();

    if changes.changed("auto_minor_version_upgrade") {
        request.auto_minor_version_upgrade = changes.bool("auto_minor_version_upgrade");
        changes.requested = true;
    }

    if changes.changed("security_group_ids") {
        let ids = changes.list("security_group_ids");
        if !ids.is_empty() {
            request.security_group_ids = Some(ids);
            changes.requested = true;
        }
    }

    if changes.changed("security_group_names") {
        let names = changes.list("security_group_names");
        if !names.is_empty() {
            request.cache_security_group_names = Some(names);
            changes.requested = true;
        }
    }

    request.preferred_maintenance_window = changes.string_if_changed("maintenance_window");
    request.notification_topic_arn = changes.string_if_changed("notification_topic_arn");
    request.cache_parameter_group_name = changes.string_if_changed("parameter_group_name");
    request.engine_version = changes.string_if_changed("engine_version");
    request.snapshot_window = changes.string_if_changed("snapshot_window");

    if changes.changed("snapshot_retention_limit") {
        request.snapshot_retention_limit = changes
            .to
            .get("snapshot_retention_limit")
            .and_then(Value::as_int)
            .and_then(|n| i32::try_from(n).ok());
        changes.requested |= request.snapshot_retention_limit.is_some();
    }

    changes.requested.then_some(request)
}
