//! Carina ElastiCache Provider
//!
//! Declarative management of ElastiCache replication groups.
//!
//! ## Module Structure
//!
//! - `resolver` - Canonical/legacy attribute resolution into a `DesiredConfig`
//! - `validation` - Replication group identifier and attribute validators
//! - `request` - Create and modify request construction
//! - `reader` - Observed group flattening and cache cluster hydration
//! - `provider` - ElastiCacheProvider CRUD operations
//! - `client` - Control plane seam (`ElastiCacheApi`)
//! - `sdk` - `ElastiCacheApi` over aws-sdk-elasticache
//! - `config` - Region and wait timings

pub mod client;
pub mod config;
pub mod provider;
pub mod reader;
pub mod request;
pub mod resolver;
pub mod sdk;
pub mod validation;

#[cfg(test)]
mod mock;

// Re-export main types
pub use client::{ClientError, ElastiCacheApi};
pub use config::{ProviderConfig, WaitTimings};
pub use provider::ElastiCacheProvider;
pub use resolver::{DesiredConfig, resolve};
pub use sdk::SdkElastiCache;
pub use validation::validate_replication_group_id;

use carina_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use carina_core::resource::{Resource, ResourceId, State};

pub const PROVIDER_NAME: &str = "elasticache";

/// `elasticache.replication_group`
pub struct ReplicationGroupType;

impl ResourceType for ReplicationGroupType {
    fn name(&self) -> &'static str {
        "elasticache.replication_group"
    }
}

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl<C: ElastiCacheApi + 'static> Provider for ElastiCacheProvider<C> {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        vec![Box::new(ReplicationGroupType)]
    }

    fn read(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.read_resource(&id, &identifier).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&id, &identifier, &from, &to).await })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&id, &identifier).await })
    }
}
