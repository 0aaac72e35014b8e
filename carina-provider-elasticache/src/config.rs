//! Provider configuration

use std::time::Duration;

use carina_core::provider::{ProviderError, ProviderResult};
use carina_core::wait::WaitConfig;
use serde::Deserialize;

/// Poll timings for one kind of operation, in seconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WaitTimings {
    /// Total time allowed (default: 40 minutes)
    pub timeout_secs: u64,
    /// First interval between observations (default: 10)
    pub min_interval_secs: u64,
    /// Cap for the growing interval (default: 30)
    pub max_interval_secs: u64,
    /// Wait before the first observation (default: 30)
    pub delay_secs: u64,
}

impl Default for WaitTimings {
    fn default() -> Self {
        Self {
            timeout_secs: 40 * 60,
            min_interval_secs: 10,
            max_interval_secs: 30,
            delay_secs: 30,
        }
    }
}

impl WaitTimings {
    /// Wait configuration for the given target and pending states
    pub fn wait_config(&self, target: &[&str], pending: &[&str]) -> WaitConfig {
        WaitConfig::new(target, pending)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_min_interval(Duration::from_secs(self.min_interval_secs))
            .with_max_interval(Duration::from_secs(self.max_interval_secs))
            .with_delay(Duration::from_secs(self.delay_secs))
    }
}

/// ElastiCache provider options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// AWS region (default: "us-east-1")
    pub region: String,
    pub create: WaitTimings,
    pub update: WaitTimings,
    pub delete: WaitTimings,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            create: WaitTimings::default(),
            update: WaitTimings::default(),
            delete: WaitTimings::default(),
        }
    }
}

impl ProviderConfig {
    pub fn with_region(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    /// Parse options from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ProviderError::validation(format!("Invalid provider configuration: {}", e))
                .with_cause(e)
        })
    }
}
