//! ElastiCache replication group provider
//!
//! Create, read, update and delete of replication groups. Every mutating
//! operation submits one request, waits for the group to settle and then
//! reads it back, so the returned `State` always reflects the remote side.

use carina_core::differ::changed_attributes;
use carina_core::provider::{ProviderError, ProviderResult};
use carina_core::resource::{Resource, ResourceId, State};
use carina_core::wait::{Observation, WaitConfig, WaitOutcome, wait_for_state};
use log::debug;

use crate::client::ElastiCacheApi;
use crate::config::ProviderConfig;
use crate::reader::{describe_group, read_replication_group};
use crate::request::{build_create, build_modify};
use crate::resolver::{DesiredConfig, resolve};
use crate::sdk::SdkElastiCache;
use crate::validation::validate_replication_group;

pub const STATUS_AVAILABLE: &str = "available";

const CREATE_PENDING: &[&str] = &["creating", "modifying", "restoring"];
const UPDATE_PENDING: &[&str] = &["creating", "modifying", "snapshotting"];
const DELETE_PENDING: &[&str] = &["creating", "available", "deleting"];

/// Provider for `elasticache.replication_group` resources
pub struct ElastiCacheProvider<C = SdkElastiCache> {
    client: C,
    config: ProviderConfig,
}

impl ElastiCacheProvider<SdkElastiCache> {
    /// Create a provider for the configured region using the ambient AWS
    /// credentials
    pub async fn new(config: ProviderConfig) -> Self {
        let client = SdkElastiCache::new(&config.region).await;
        Self { client, config }
    }
}

impl<C: ElastiCacheApi> ElastiCacheProvider<C> {
    /// Create with a specific client (for testing)
    pub fn with_client(client: C, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Wait until `identifier` settles according to `wait`
    async fn wait_for_group(
        &self,
        identifier: &str,
        wait: &WaitConfig,
    ) -> ProviderResult<WaitOutcome<()>> {
        wait_for_state(identifier, wait, move || async move {
            Ok(match describe_group(&self.client, identifier).await? {
                Some(group) => Observation::Found {
                    status: group.status,
                    value: (),
                },
                None => Observation::NotFound,
            })
        })
        .await
    }

    /// Resolve and validate the desired configuration of `resource`
    fn desired_config(&self, resource: &Resource) -> ProviderResult<DesiredConfig> {
        let desired = resolve(resource).map_err(|e| e.for_resource(resource.id.clone()))?;

        if let Err(errors) = validate_replication_group(&desired) {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(ProviderError::validation(messages.join("; "))
                .for_resource(resource.id.clone()));
        }

        Ok(desired)
    }

    /// Read a replication group
    pub async fn read_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        read_replication_group(&self.client, id, identifier).await
    }

    /// Create a replication group and wait until it is available
    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        let desired = self.desired_config(resource)?;
        let request = build_create(&desired);
        let created = self
            .client
            .create_replication_group(&request)
            .await
            .map_err(|e| {
                ProviderError::new(format!("Error creating replication group: {}", e))
                    .for_resource(resource.id.clone())
                    .with_cause(e)
            })?;
        let identifier = created.replication_group_id;

        debug!("Waiting for replication group {} to become available", identifier);
        let wait = self
            .config
            .create
            .wait_config(&[STATUS_AVAILABLE], CREATE_PENDING);
        self.wait_for_group(&identifier, &wait).await.map_err(|e| {
            ProviderError::with_kind(
                e.kind,
                format!(
                    "Error waiting for replication group ({}) to be created: {}",
                    identifier, e.message
                ),
            )
            .for_resource(resource.id.clone())
        })?;

        self.read_resource(&resource.id, &identifier).await
    }

    /// Apply changed attributes of `to` to a replication group
    ///
    /// When nothing changed since `from` was observed, no request is sent
    /// and the group is only read back.
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        self.desired_config(to)?;

        if let Some(request) = build_modify(identifier, from, to) {
            debug!(
                "Modifying replication group {}: {}",
                identifier,
                changed_attributes(to, from).join(", ")
            );
            self.client
                .modify_replication_group(&request)
                .await
                .map_err(|e| {
                    ProviderError::new(format!("Error updating replication group: {}", e))
                        .for_resource(id.clone())
                        .with_cause(e)
                })?;

            debug!("Waiting for replication group {} to become available", identifier);
            let wait = self
                .config
                .update
                .wait_config(&[STATUS_AVAILABLE], UPDATE_PENDING);
            self.wait_for_group(identifier, &wait).await.map_err(|e| {
                ProviderError::with_kind(
                    e.kind,
                    format!(
                        "Error waiting for replication group ({}) to be updated: {}",
                        identifier, e.message
                    ),
                )
                .for_resource(id.clone())
            })?;
        } else {
            debug!("No changes for replication group {}", identifier);
        }

        self.read_resource(id, identifier).await
    }

    /// Delete a replication group and wait until it is gone
    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        match self.client.delete_replication_group(identifier).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!("Replication group {} already deleted", identifier);
                return Ok(());
            }
            Err(e) => {
                return Err(
                    ProviderError::new(format!("Error deleting replication group: {}", e))
                        .for_resource(id.clone())
                        .with_cause(e),
                );
            }
        }

        debug!("Waiting for deletion of replication group {}", identifier);
        let wait = self.config.delete.wait_config(&[], DELETE_PENDING);
        self.wait_for_group(identifier, &wait).await.map_err(|e| {
            ProviderError::with_kind(
                e.kind,
                format!(
                    "Error waiting for replication group ({}) to delete: {}",
                    identifier, e.message
                ),
            )
            .for_resource(id.clone())
        })?;

        Ok(())
    }
}
