//! Control plane client seam
//!
//! `ElastiCacheApi` is the set of ElastiCache control plane calls the
//! replication group resource needs. The provider receives an implementation
//! through its constructor; `crate::sdk` implements it over the AWS SDK.

use std::collections::HashMap;

use async_trait::async_trait;
use carina_core::provider::{ErrorKind, ProviderError};
use thiserror::Error;

/// Errors returned by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The replication group (or cache cluster) does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other rejection or transport failure
    #[error("{0}")]
    Remote(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        let kind = match err {
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Remote(_) => ErrorKind::Remote,
        };
        ProviderError::with_kind(kind, err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Address and port of a cache endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    pub address: Option<String>,
    pub port: Option<i32>,
}

/// One shard of a replication group
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeGroup {
    pub node_group_id: Option<String>,
    pub primary_endpoint: Option<Endpoint>,
    /// Cache cluster ids of the members, primary first as reported
    pub members: Vec<String>,
}

/// Observed replication group
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplicationGroup {
    pub replication_group_id: String,
    pub description: Option<String>,
    /// Lifecycle status, e.g. "creating", "available", "deleting"
    pub status: String,
    /// Raw failover status, e.g. "enabled", "disabling"
    pub automatic_failover: Option<String>,
    pub member_clusters: Vec<String>,
    /// Present for cluster-mode groups only
    pub configuration_endpoint: Option<Endpoint>,
    pub node_groups: Vec<NodeGroup>,
    pub snapshot_window: Option<String>,
    pub snapshot_retention_limit: Option<i32>,
}

/// Detail of one member cache cluster
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheCluster {
    pub cache_cluster_id: String,
    pub cache_node_type: Option<String>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub cache_subnet_group_name: Option<String>,
    pub cache_security_group_names: Vec<String>,
    pub security_group_ids: Vec<String>,
    pub cache_parameter_group_name: Option<String>,
    pub preferred_maintenance_window: Option<String>,
    pub notification_topic_arn: Option<String>,
    pub auto_minor_version_upgrade: Option<bool>,
}

/// Request to create a replication group
///
/// Optional fields left as `None` (or empty lists) are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateReplicationGroupRequest {
    pub replication_group_id: String,
    pub description: String,
    pub cache_node_type: String,
    pub engine: String,
    pub auto_minor_version_upgrade: bool,
    pub port: i32,
    pub tags: HashMap<String, String>,
    pub engine_version: Option<String>,
    pub num_cache_clusters: Option<i32>,
    pub automatic_failover_enabled: Option<bool>,
    pub preferred_cache_cluster_azs: Vec<String>,
    pub cache_parameter_group_name: Option<String>,
    pub cache_subnet_group_name: Option<String>,
    pub cache_security_group_names: Vec<String>,
    pub security_group_ids: Vec<String>,
    pub snapshot_arns: Vec<String>,
    pub snapshot_retention_limit: Option<i32>,
    pub snapshot_window: Option<String>,
    pub snapshot_name: Option<String>,
    pub preferred_maintenance_window: Option<String>,
    pub notification_topic_arn: Option<String>,
}

/// Request to modify a replication group
///
/// Only changed fields are set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifyReplicationGroupRequest {
    pub replication_group_id: String,
    pub apply_immediately: bool,
    pub description: Option<String>,
    pub automatic_failover_enabled: Option<bool>,
    pub auto_minor_version_upgrade: Option<bool>,
    pub security_group_ids: Option<Vec<String>>,
    pub cache_security_group_names: Option<Vec<String>>,
    pub preferred_maintenance_window: Option<String>,
    pub notification_topic_arn: Option<String>,
    pub cache_parameter_group_name: Option<String>,
    pub engine_version: Option<String>,
    pub snapshot_retention_limit: Option<i32>,
    pub snapshot_window: Option<String>,
    pub cache_node_type: Option<String>,
}

/// ElastiCache control plane operations
#[async_trait]
pub trait ElastiCacheApi: Send + Sync {
    /// Submit a create request; returns the group as accepted
    async fn create_replication_group(
        &self,
        request: &CreateReplicationGroupRequest,
    ) -> ClientResult<ReplicationGroup>;

    /// Describe groups matching `replication_group_id`
    ///
    /// Fails with `ClientError::NotFound` when the group does not exist
    async fn describe_replication_groups(
        &self,
        replication_group_id: &str,
    ) -> ClientResult<Vec<ReplicationGroup>>;

    /// Describe one member cache cluster, including node info
    async fn describe_cache_clusters(&self, cache_cluster_id: &str)
    -> ClientResult<Vec<CacheCluster>>;

    async fn modify_replication_group(
        &self,
        request: &ModifyReplicationGroupRequest,
    ) -> ClientResult<()>;

    async fn delete_replication_group(&self, replication_group_id: &str) -> ClientResult<()>;
}
