//! Reading replication groups back into flat state

use std::collections::HashMap;

use carina_core::provider::{ProviderError, ProviderResult};
use carina_core::resource::{ResourceId, State, Value};
use log::{debug, warn};

use crate::client::{CacheCluster, ClientError, ElastiCacheApi, ReplicationGroup};

/// Lifecycle status of a group being torn down
pub const STATUS_DELETING: &str = "deleting";

/// Classified automatic failover status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverStatus {
    Enabled,
    Enabling,
    Disabled,
    Disabling,
    Unknown,
}

impl FailoverStatus {
    /// Classify a raw status, ignoring case
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "enabled" => FailoverStatus::Enabled,
            "enabling" => FailoverStatus::Enabling,
            "disabled" => FailoverStatus::Disabled,
            "disabling" => FailoverStatus::Disabling,
            _ => FailoverStatus::Unknown,
        }
    }

    /// Whether failover is (becoming) enabled; `None` when unknown
    pub fn as_flag(self) -> Option<bool> {
        match self {
            FailoverStatus::Enabled | FailoverStatus::Enabling => Some(true),
            FailoverStatus::Disabled | FailoverStatus::Disabling => Some(false),
            FailoverStatus::Unknown => None,
        }
    }
}

/// Describe one replication group by id
///
/// Returns `None` when the service reports it missing or the response does
/// not contain a group with that id.
pub async fn describe_group<C>(
    client: &C,
    replication_group_id: &str,
) -> ProviderResult<Option<ReplicationGroup>>
where
    C: ElastiCacheApi + ?Sized,
{
    match client.describe_replication_groups(replication_group_id).await {
        Ok(groups) => Ok(groups
            .into_iter()
            .find(|g| g.replication_group_id == replication_group_id)),
        Err(ClientError::NotFound(_)) => {
            debug!("Replication group {} not found", replication_group_id);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn string(value: &str) -> Value {
    Value::String(value.to_string())
}

/// Flatten the group-level attributes, endpoints included
pub fn flatten_replication_group(group: &ReplicationGroup) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();

    attributes.insert(
        "replication_group_id".to_string(),
        string(&group.replication_group_id),
    );
    if let Some(description) = &group.description {
        attributes.insert(
            "replication_group_description".to_string(),
            string(description),
        );
    }
    attributes.insert(
        "number_cache_clusters".to_string(),
        Value::Int(group.member_clusters.len() as i64),
    );

    if let Some(raw) = &group.automatic_failover {
        match FailoverStatus::parse(raw).as_flag() {
            Some(enabled) => {
                attributes.insert("automatic_failover_enabled".to_string(), Value::Bool(enabled));
            }
            None => warn!(
                "Unknown automatic failover state {} for replication group {}",
                raw, group.replication_group_id
            ),
        }
    }

    if let Some(window) = &group.snapshot_window {
        attributes.insert("snapshot_window".to_string(), string(window));
    }
    if let Some(limit) = group.snapshot_retention_limit {
        attributes.insert("snapshot_retention_limit".to_string(), Value::Int(limit as i64));
    }

    if let Some(endpoint) = &group.configuration_endpoint {
        if let Some(address) = &endpoint.address {
            attributes.insert("configuration_endpoint_address".to_string(), string(address));
        }
        if let Some(port) = endpoint.port {
            attributes.insert("port".to_string(), Value::Int(port as i64));
        }
    } else if let Some(endpoint) = group
        .node_groups
        .first()
        .and_then(|ng| ng.primary_endpoint.as_ref())
    {
        if let Some(address) = &endpoint.address {
            attributes.insert("primary_endpoint_address".to_string(), string(address));
            attributes.insert("primary_endpoint".to_string(), string(address));
        }
        if let Some(port) = endpoint.port {
            attributes.insert("port".to_string(), Value::Int(port as i64));
        }
    }

    attributes
}

/// Copy member node detail into `attributes`
pub fn hydrate_from_cache_cluster(cluster: &CacheCluster, attributes: &mut HashMap<String, Value>) {
    let optional = [
        ("node_type", &cluster.cache_node_type),
        ("engine", &cluster.engine),
        ("engine_version", &cluster.engine_version),
        ("subnet_group_name", &cluster.cache_subnet_group_name),
        ("parameter_group_name", &cluster.cache_parameter_group_name),
        ("maintenance_window", &cluster.preferred_maintenance_window),
        ("notification_topic_arn", &cluster.notification_topic_arn),
    ];
    for (key, value) in optional {
        if let Some(v) = value {
            attributes.insert(key.to_string(), string(v));
        }
    }

    attributes.insert(
        "security_group_names".to_string(),
        Value::string_list(cluster.cache_security_group_names.iter().cloned()),
    );
    attributes.insert(
        "security_group_ids".to_string(),
        Value::string_list(cluster.security_group_ids.iter().cloned()),
    );
    if let Some(upgrade) = cluster.auto_minor_version_upgrade {
        attributes.insert("auto_minor_version_upgrade".to_string(), Value::Bool(upgrade));
    }
}

/// Read the replication group `identifier` into a flat `State`
///
/// A missing group, or one being deleted, reads as `State::not_found`,
/// which clears the persisted identifier.
pub async fn read_replication_group<C>(
    client: &C,
    id: &ResourceId,
    identifier: &str,
) -> ProviderResult<State>
where
    C: ElastiCacheApi + ?Sized,
{
    let group = match describe_group(client, identifier).await? {
        Some(group) => group,
        None => {
            warn!("Replication group {} not found, removing from state", identifier);
            return Ok(State::not_found(id.clone()));
        }
    };

    if group.status == STATUS_DELETING {
        warn!(
            "Replication group {} is currently in the deleting state, removing from state",
            identifier
        );
        return Ok(State::not_found(id.clone()));
    }

    let mut attributes = flatten_replication_group(&group);
    let state = |attributes: HashMap<String, Value>| {
        State::existing(id.clone(), attributes).with_identifier(identifier)
    };

    let Some(member) = group
        .node_groups
        .first()
        .and_then(|ng| ng.members.first())
    else {
        return Ok(state(attributes));
    };

    let clusters = client
        .describe_cache_clusters(member)
        .await
        .map_err(|e| ProviderError::from(e).for_resource(id.clone()))?;

    match clusters.first() {
        Some(cluster) => hydrate_from_cache_cluster(cluster, &mut attributes),
        None => warn!(
            "No cache cluster detail for member {} of replication group {}, node attributes left unset",
            member, identifier
        ),
    }

    Ok(state(attributes))
}
