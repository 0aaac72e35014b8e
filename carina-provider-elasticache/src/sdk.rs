//! `ElastiCacheApi` over the AWS SDK

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_elasticache::Client as ElastiCacheClient;
use aws_sdk_elasticache::error::{DisplayErrorContext, SdkError};
use aws_sdk_elasticache::operation::delete_replication_group::DeleteReplicationGroupError;
use aws_sdk_elasticache::operation::describe_cache_clusters::DescribeCacheClustersError;
use aws_sdk_elasticache::operation::describe_replication_groups::DescribeReplicationGroupsError;
use aws_sdk_elasticache::types::{self as sdk, Tag};

use crate::client::{
    CacheCluster, ClientError, ClientResult, CreateReplicationGroupRequest, ElastiCacheApi,
    Endpoint, ModifyReplicationGroupRequest, NodeGroup, ReplicationGroup,
};

/// ElastiCache control plane client backed by `aws-sdk-elasticache`
pub struct SdkElastiCache {
    client: ElastiCacheClient,
}

impl SdkElastiCache {
    /// Create a client for the specified region
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self::from_client(ElastiCacheClient::new(&config))
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: ElastiCacheClient) -> Self {
        Self { client }
    }
}

/// Map an SDK error, recognising the operation's not-found fault
fn client_error<E, R>(err: SdkError<E, R>, id: &str, is_not_found: fn(&E) -> bool) -> ClientError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if err.as_service_error().is_some_and(is_not_found) {
        ClientError::NotFound(id.to_string())
    } else {
        ClientError::Remote(DisplayErrorContext(&err).to_string())
    }
}

fn non_empty(items: &[String]) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items.to_vec())
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn convert_endpoint(endpoint: &sdk::Endpoint) -> Endpoint {
    Endpoint {
        address: owned(endpoint.address()),
        port: endpoint.port(),
    }
}

fn convert_node_group(node_group: &sdk::NodeGroup) -> NodeGroup {
    NodeGroup {
        node_group_id: owned(node_group.node_group_id()),
        primary_endpoint: node_group.primary_endpoint().map(convert_endpoint),
        members: node_group
            .node_group_members()
            .iter()
            .filter_map(|m| owned(m.cache_cluster_id()))
            .collect(),
    }
}

fn convert_replication_group(group: &sdk::ReplicationGroup) -> ReplicationGroup {
    ReplicationGroup {
        replication_group_id: group.replication_group_id().unwrap_or_default().to_string(),
        description: owned(group.description()),
        status: group.status().unwrap_or_default().to_string(),
        automatic_failover: group.automatic_failover().map(|s| s.as_str().to_string()),
        member_clusters: group.member_clusters().to_vec(),
        configuration_endpoint: group.configuration_endpoint().map(convert_endpoint),
        node_groups: group.node_groups().iter().map(convert_node_group).collect(),
        snapshot_window: owned(group.snapshot_window()),
        snapshot_retention_limit: group.snapshot_retention_limit(),
    }
}

fn convert_cache_cluster(cluster: &sdk::CacheCluster) -> CacheCluster {
    CacheCluster {
        cache_cluster_id: cluster.cache_cluster_id().unwrap_or_default().to_string(),
        cache_node_type: owned(cluster.cache_node_type()),
        engine: owned(cluster.engine()),
        engine_version: owned(cluster.engine_version()),
        cache_subnet_group_name: owned(cluster.cache_subnet_group_name()),
        cache_security_group_names: cluster
            .cache_security_groups()
            .iter()
            .filter_map(|g| owned(g.cache_security_group_name()))
            .collect(),
        security_group_ids: cluster
            .security_groups()
            .iter()
            .filter_map(|g| owned(g.security_group_id()))
            .collect(),
        cache_parameter_group_name: cluster
            .cache_parameter_group()
            .and_then(|p| owned(p.cache_parameter_group_name())),
        preferred_maintenance_window: owned(cluster.preferred_maintenance_window()),
        notification_topic_arn: cluster
            .notification_configuration()
            .and_then(|n| owned(n.topic_arn())),
        auto_minor_version_upgrade: cluster.auto_minor_version_upgrade(),
    }
}

#[async_trait]
impl ElastiCacheApi for SdkElastiCache {
    async fn create_replication_group(
        &self,
        request: &CreateReplicationGroupRequest,
    ) -> ClientResult<ReplicationGroup> {
        let tags: Vec<Tag> = request
            .tags
            .iter()
            .map(|(key, value)| Tag::builder().key(key).value(value).build())
            .collect();

        let output = self
            .client
            .create_replication_group()
            .replication_group_id(&request.replication_group_id)
            .replication_group_description(&request.description)
            .cache_node_type(&request.cache_node_type)
            .engine(&request.engine)
            .auto_minor_version_upgrade(request.auto_minor_version_upgrade)
            .port(request.port)
            .set_tags((!tags.is_empty()).then_some(tags))
            .set_engine_version(request.engine_version.clone())
            .set_num_cache_clusters(request.num_cache_clusters)
            .set_automatic_failover_enabled(request.automatic_failover_enabled)
            .set_preferred_cache_cluster_azs(non_empty(&request.preferred_cache_cluster_azs))
            .set_cache_parameter_group_name(request.cache_parameter_group_name.clone())
            .set_cache_subnet_group_name(request.cache_subnet_group_name.clone())
            .set_cache_security_group_names(non_empty(&request.cache_security_group_names))
            .set_security_group_ids(non_empty(&request.security_group_ids))
            .set_snapshot_arns(non_empty(&request.snapshot_arns))
            .set_snapshot_retention_limit(request.snapshot_retention_limit)
            .set_snapshot_window(request.snapshot_window.clone())
            .set_snapshot_name(request.snapshot_name.clone())
            .set_preferred_maintenance_window(request.preferred_maintenance_window.clone())
            .set_notification_topic_arn(request.notification_topic_arn.clone())
            .send()
            .await
            .map_err(|e| client_error(e, &request.replication_group_id, |_| false))?;

        output
            .replication_group()
            .map(convert_replication_group)
            .ok_or_else(|| ClientError::Remote("No replication group returned".to_string()))
    }

    async fn describe_replication_groups(
        &self,
        replication_group_id: &str,
    ) -> ClientResult<Vec<ReplicationGroup>> {
        let output = self
            .client
            .describe_replication_groups()
            .replication_group_id(replication_group_id)
            .send()
            .await
            .map_err(|e| {
                client_error(
                    e,
                    replication_group_id,
                    DescribeReplicationGroupsError::is_replication_group_not_found_fault,
                )
            })?;

        Ok(output
            .replication_groups()
            .iter()
            .map(convert_replication_group)
            .collect())
    }

    async fn describe_cache_clusters(
        &self,
        cache_cluster_id: &str,
    ) -> ClientResult<Vec<CacheCluster>> {
        let output = self
            .client
            .describe_cache_clusters()
            .cache_cluster_id(cache_cluster_id)
            .show_cache_node_info(true)
            .send()
            .await
            .map_err(|e| {
                client_error(
                    e,
                    cache_cluster_id,
                    DescribeCacheClustersError::is_cache_cluster_not_found_fault,
                )
            })?;

        Ok(output
            .cache_clusters()
            .iter()
            .map(convert_cache_cluster)
            .collect())
    }

    async fn modify_replication_group(
        &self,
        request: &ModifyReplicationGroupRequest,
    ) -> ClientResult<()> {
        self.client
            .modify_replication_group()
            .replication_group_id(&request.replication_group_id)
            .apply_immediately(request.apply_immediately)
            .set_replication_group_description(request.description.clone())
            .set_automatic_failover_enabled(request.automatic_failover_enabled)
            .set_auto_minor_version_upgrade(request.auto_minor_version_upgrade)
            .set_security_group_ids(request.security_group_ids.clone())
            .set_cache_security_group_names(request.cache_security_group_names.clone())
            .set_preferred_maintenance_window(request.preferred_maintenance_window.clone())
            .set_notification_topic_arn(request.notification_topic_arn.clone())
            .set_cache_parameter_group_name(request.cache_parameter_group_name.clone())
            .set_engine_version(request.engine_version.clone())
            .set_snapshot_retention_limit(request.snapshot_retention_limit)
            .set_snapshot_window(request.snapshot_window.clone())
            .set_cache_node_type(request.cache_node_type.clone())
            .send()
            .await
            .map_err(|e| client_error(e, &request.replication_group_id, |_| false))?;

        Ok(())
    }

    async fn delete_replication_group(&self, replication_group_id: &str) -> ClientResult<()> {
        self.client
            .delete_replication_group()
            .replication_group_id(replication_group_id)
            .send()
            .await
            .map_err(|e| {
                client_error(
                    e,
                    replication_group_id,
                    DeleteReplicationGroupError::is_replication_group_not_found_fault,
                )
            })?;

        Ok(())
    }
}
