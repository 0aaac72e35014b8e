//! Scripted in-memory control plane for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{
    CacheCluster, ClientError, ClientResult, CreateReplicationGroupRequest, ElastiCacheApi,
    ModifyReplicationGroupRequest, ReplicationGroup,
};

/// A control plane call as received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(CreateReplicationGroupRequest),
    Describe(String),
    DescribeCacheClusters(String),
    Modify(ModifyReplicationGroupRequest),
    Delete(String),
}

/// Describe responses are served in order; the last one repeats forever
#[derive(Default)]
pub struct MockElastiCache {
    describe: Mutex<VecDeque<ClientResult<Vec<ReplicationGroup>>>>,
    cache_clusters: Vec<CacheCluster>,
    create_error: Option<ClientError>,
    modify_error: Option<ClientError>,
    delete_error: Option<ClientError>,
    calls: Mutex<Vec<Call>>,
}

impl MockElastiCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_describe(mut self, responses: Vec<ClientResult<Vec<ReplicationGroup>>>) -> Self {
        self.describe = Mutex::new(responses.into());
        self
    }

    pub fn with_cache_clusters(mut self, clusters: Vec<CacheCluster>) -> Self {
        self.cache_clusters = clusters;
        self
    }

    pub fn with_create_error(mut self, err: ClientError) -> Self {
        self.create_error = Some(err);
        self
    }

    pub fn with_modify_error(mut self, err: ClientError) -> Self {
        self.modify_error = Some(err);
        self
    }

    pub fn with_delete_error(mut self, err: ClientError) -> Self {
        self.delete_error = Some(err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn describe_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Describe(_)))
            .count()
    }

    pub fn creates(&self) -> Vec<CreateReplicationGroupRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn modifies(&self) -> Vec<ModifyReplicationGroupRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Modify(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn cache_cluster_requests(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DescribeCacheClusters(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ElastiCacheApi for MockElastiCache {
    async fn create_replication_group(
        &self,
        request: &CreateReplicationGroupRequest,
    ) -> ClientResult<ReplicationGroup> {
        self.record(Call::Create(request.clone()));
        match &self.create_error {
            Some(err) => Err(err.clone()),
            None => Ok(ReplicationGroup {
                replication_group_id: request.replication_group_id.clone(),
                description: Some(request.description.clone()),
                status: "creating".to_string(),
                ..Default::default()
            }),
        }
    }

    async fn describe_replication_groups(
        &self,
        replication_group_id: &str,
    ) -> ClientResult<Vec<ReplicationGroup>> {
        self.record(Call::Describe(replication_group_id.to_string()));
        let mut responses = self.describe.lock().unwrap();
        match responses.len() {
            0 => Err(ClientError::NotFound(replication_group_id.to_string())),
            1 => responses[0].clone(),
            _ => responses
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::NotFound(replication_group_id.to_string()))),
        }
    }

    async fn describe_cache_clusters(
        &self,
        cache_cluster_id: &str,
    ) -> ClientResult<Vec<CacheCluster>> {
        self.record(Call::DescribeCacheClusters(cache_cluster_id.to_string()));
        Ok(self.cache_clusters.clone())
    }

    async fn modify_replication_group(
        &self,
        request: &ModifyReplicationGroupRequest,
    ) -> ClientResult<()> {
        self.record(Call::Modify(request.clone()));
        match &self.modify_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn delete_replication_group(&self, replication_group_id: &str) -> ClientResult<()> {
        self.record(Call::Delete(replication_group_id.to_string()));
        match &self.delete_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
