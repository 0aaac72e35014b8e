//! Field resolution
//!
//! Several concepts of a replication group can be spelled two ways: the
//! current attribute name and a legacy one kept for older configurations.
//! `RESOLUTIONS` lists, per concept, the candidate attributes in order of
//! preference; the first one holding a usable value becomes the canonical
//! value in `DesiredConfig`.

use std::collections::HashMap;

use carina_core::provider::{ProviderError, ProviderResult};
use carina_core::resource::{Resource, Value};

/// Which candidate values count as set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// A non-empty string
    NonEmptyString,
    /// A non-zero integer
    NonZeroInt,
    /// Any value, including `false`
    Present,
    /// A non-empty list
    NonEmptyList,
}

/// One concept with its candidate attributes, most preferred first
#[derive(Debug)]
pub struct Resolution {
    pub concept: &'static str,
    pub sources: &'static [&'static str],
    pub pick: Pick,
    /// Error message when no candidate is set, for required concepts
    pub required: Option<&'static str>,
}

pub const REPLICATION_GROUP_ID: Resolution = Resolution {
    concept: "replication_group_id",
    sources: &["replication_group_id", "cluster_name"],
    pick: Pick::NonEmptyString,
    required: Some("identifier is required"),
};

pub const DESCRIPTION: Resolution = Resolution {
    concept: "replication_group_description",
    sources: &["replication_group_description", "description"],
    pick: Pick::NonEmptyString,
    required: Some("description is required"),
};

pub const NODE_TYPE: Resolution = Resolution {
    concept: "node_type",
    sources: &["node_type", "cache_node_type"],
    pick: Pick::NonEmptyString,
    required: Some("node type is required"),
};

pub const NUMBER_CACHE_CLUSTERS: Resolution = Resolution {
    concept: "number_cache_clusters",
    sources: &["number_cache_clusters", "num_cache_clusters"],
    pick: Pick::NonZeroInt,
    required: None,
};

pub const AUTOMATIC_FAILOVER: Resolution = Resolution {
    concept: "automatic_failover_enabled",
    sources: &["automatic_failover_enabled", "automatic_failover"],
    pick: Pick::Present,
    required: None,
};

pub const AVAILABILITY_ZONES: Resolution = Resolution {
    concept: "availability_zones",
    sources: &["availability_zones", "preferred_cache_cluster_azs"],
    pick: Pick::NonEmptyList,
    required: None,
};

pub const RESOLUTIONS: &[&Resolution] = &[
    &REPLICATION_GROUP_ID,
    &DESCRIPTION,
    &NODE_TYPE,
    &NUMBER_CACHE_CLUSTERS,
    &AUTOMATIC_FAILOVER,
    &AVAILABILITY_ZONES,
];

fn is_set(value: &Value, pick: Pick) -> bool {
    match (pick, value) {
        (Pick::NonEmptyString, Value::String(s)) => !s.is_empty(),
        (Pick::NonZeroInt, Value::Int(i)) => *i != 0,
        (Pick::NonEmptyList, Value::List(items)) => !items.is_empty(),
        (Pick::Present, _) => true,
        _ => false,
    }
}

/// First candidate value that counts as set, with the attribute it came from
pub fn resolve_value<'a>(
    attributes: &'a HashMap<String, Value>,
    resolution: &Resolution,
) -> Option<(&'static str, &'a Value)> {
    resolution.sources.iter().find_map(|source| {
        attributes
            .get(*source)
            .filter(|value| is_set(value, resolution.pick))
            .map(|value| (*source, value))
    })
}

/// Resolve a concept that must be set, as a string
fn resolve_required_string(
    attributes: &HashMap<String, Value>,
    resolution: &Resolution,
) -> ProviderResult<String> {
    match resolve_value(attributes, resolution) {
        Some((key, value)) => string_value(key, value),
        None => Err(ProviderError::validation(
            resolution.required.unwrap_or("required attribute is missing"),
        )),
    }
}

/// Canonical user intentions for a replication group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DesiredConfig {
    pub replication_group_id: String,
    pub description: String,
    pub node_type: String,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub number_cache_clusters: Option<i32>,
    pub automatic_failover_enabled: Option<bool>,
    pub auto_minor_version_upgrade: Option<bool>,
    /// `None` when unset or 0
    pub port: Option<i32>,
    pub parameter_group_name: Option<String>,
    pub subnet_group_name: Option<String>,
    pub security_group_names: Vec<String>,
    pub security_group_ids: Vec<String>,
    pub availability_zones: Vec<String>,
    pub snapshot_arns: Vec<String>,
    pub snapshot_retention_limit: Option<i32>,
    pub snapshot_window: Option<String>,
    pub snapshot_name: Option<String>,
    pub maintenance_window: Option<String>,
    pub notification_topic_arn: Option<String>,
    pub tags: HashMap<String, String>,
    pub apply_immediately: bool,
}

fn type_error(key: &str, expected: &str) -> ProviderError {
    ProviderError::validation(format!("{} must be {}", key, expected))
}

fn string_value(key: &str, value: &Value) -> ProviderResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| type_error(key, "a string"))
}

/// Integer attributes are sent as 32-bit fields
fn int_value(key: &str, value: &Value) -> ProviderResult<i32> {
    let n = value.as_int().ok_or_else(|| type_error(key, "an integer"))?;
    i32::try_from(n)
        .map_err(|_| ProviderError::validation(format!("{} is out of range: {}", key, n)))
}

fn bool_value(key: &str, value: &Value) -> ProviderResult<bool> {
    value.as_bool().ok_or_else(|| type_error(key, "a boolean"))
}

fn list_value(key: &str, value: &Value) -> ProviderResult<Vec<String>> {
    value
        .as_string_list()
        .ok_or_else(|| type_error(key, "a list of strings"))
}

/// Typed access to plain (single-spelling) attributes
struct Attributes<'a>(&'a HashMap<String, Value>);

impl Attributes<'_> {
    fn string(&self, key: &str) -> ProviderResult<Option<String>> {
        match self.0.get(key) {
            Some(value) => Ok(Some(string_value(key, value)?).filter(|s| !s.is_empty())),
            None => Ok(None),
        }
    }

    fn int(&self, key: &str) -> ProviderResult<Option<i32>> {
        self.0.get(key).map(|v| int_value(key, v)).transpose()
    }

    fn bool(&self, key: &str) -> ProviderResult<Option<bool>> {
        self.0.get(key).map(|v| bool_value(key, v)).transpose()
    }

    fn list(&self, key: &str) -> ProviderResult<Vec<String>> {
        match self.0.get(key) {
            Some(value) => list_value(key, value),
            None => Ok(Vec::new()),
        }
    }

    fn tags(&self) -> ProviderResult<HashMap<String, String>> {
        match self.0.get("tags") {
            Some(Value::Map(map)) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), string_value("tags", v)?)))
                .collect(),
            Some(_) => Err(type_error("tags", "a map of strings")),
            None => Ok(HashMap::new()),
        }
    }
}

/// Collapse the input attributes of `resource` into a `DesiredConfig`
pub fn resolve(resource: &Resource) -> ProviderResult<DesiredConfig> {
    let attrs = &resource.attributes;
    let plain = Attributes(attrs);

    let replication_group_id = resolve_required_string(attrs, &REPLICATION_GROUP_ID)?;
    let description = resolve_required_string(attrs, &DESCRIPTION)?;
    let node_type = resolve_required_string(attrs, &NODE_TYPE)?;

    let number_cache_clusters = resolve_value(attrs, &NUMBER_CACHE_CLUSTERS)
        .map(|(key, value)| int_value(key, value))
        .transpose()?;
    let automatic_failover_enabled = resolve_value(attrs, &AUTOMATIC_FAILOVER)
        .map(|(key, value)| bool_value(key, value))
        .transpose()?;
    let availability_zones = resolve_value(attrs, &AVAILABILITY_ZONES)
        .map(|(key, value)| list_value(key, value))
        .transpose()?
        .unwrap_or_default();

    Ok(DesiredConfig {
        replication_group_id,
        description,
        node_type,
        engine: plain.string("engine")?,
        engine_version: plain.string("engine_version")?,
        number_cache_clusters,
        automatic_failover_enabled,
        auto_minor_version_upgrade: plain.bool("auto_minor_version_upgrade")?,
        port: plain.int("port")?.filter(|p| *p != 0),
        parameter_group_name: plain.string("parameter_group_name")?,
        subnet_group_name: plain.string("subnet_group_name")?,
        security_group_names: plain.list("security_group_names")?,
        security_group_ids: plain.list("security_group_ids")?,
        availability_zones,
        snapshot_arns: plain.list("snapshot_arns")?,
        snapshot_retention_limit: plain.int("snapshot_retention_limit")?,
        snapshot_window: plain.string("snapshot_window")?,
        snapshot_name: plain.string("snapshot_name")?,
        maintenance_window: plain.string("maintenance_window")?,
        notification_topic_arn: plain.string("notification_topic_arn")?,
        tags: plain.tags()?,
        apply_immediately: plain.bool("apply_immediately")?.unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use carina_core::provider::ErrorKind;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    fn base() -> Resource {
        Resource::new("elasticache.replication_group", "cache")
            .with_attribute("replication_group_id", s("tf-cache"))
            .with_attribute("replication_group_description", s("cache group"))
            .with_attribute("node_type", s("cache.m3.medium"))
    }

    #[test]
    fn current_node_type_wins() {
        let resource = base()
            .with_attribute("node_type", s("a"))
            .with_attribute("cache_node_type", s("b"));
        assert_eq!(resolve(&resource).unwrap().node_type, "a");
    }

    #[test]
    fn legacy_node_type_used_alone() {
        let mut resource = base().with_attribute("cache_node_type", s("b"));
        resource.attributes.remove("node_type");
        assert_eq!(resolve(&resource).unwrap().node_type, "b");
    }

    #[test]
    fn empty_node_type_falls_back_to_legacy() {
        let resource = base()
            .with_attribute("node_type", s(""))
            .with_attribute("cache_node_type", s("b"));
        assert_eq!(resolve(&resource).unwrap().node_type, "b");
    }

    #[test]
    fn missing_node_type_is_validation_error() {
        let mut resource = base();
        resource.attributes.remove("node_type");
        let err = resolve(&resource).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "node type is required");
    }

    #[test]
    fn identifier_falls_back_to_cluster_name() {
        let mut resource = base().with_attribute("cluster_name", s("legacy-id"));
        resource.attributes.remove("replication_group_id");
        assert_eq!(resolve(&resource).unwrap().replication_group_id, "legacy-id");

        resource.attributes.remove("cluster_name");
        let err = resolve(&resource).unwrap_err();
        assert_eq!(err.message, "identifier is required");
    }

    #[test]
    fn description_falls_back_to_legacy() {
        let mut resource = base().with_attribute("description", s("legacy"));
        resource.attributes.remove("replication_group_description");
        assert_eq!(resolve(&resource).unwrap().description, "legacy");

        resource.attributes.remove("description");
        let err = resolve(&resource).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "description is required");
    }

    #[test]
    fn failover_current_wins_even_when_false() {
        let resource = base()
            .with_attribute("automatic_failover_enabled", Value::Bool(false))
            .with_attribute("automatic_failover", Value::Bool(true));
        assert_eq!(resolve(&resource).unwrap().automatic_failover_enabled, Some(false));
    }

    #[test]
    fn unset_pairs_stay_unset() {
        let config = resolve(&base()).unwrap();
        assert_eq!(config.automatic_failover_enabled, None);
        assert_eq!(config.number_cache_clusters, None);
        assert!(config.availability_zones.is_empty());
        assert!(!config.apply_immediately);
    }

    #[test]
    fn cluster_count_zero_falls_back_to_legacy() {
        let resource = base()
            .with_attribute("number_cache_clusters", Value::Int(0))
            .with_attribute("num_cache_clusters", Value::Int(3));
        assert_eq!(resolve(&resource).unwrap().number_cache_clusters, Some(3));
    }

    #[test]
    fn availability_zones_prefer_explicit_list() {
        let resource = base()
            .with_attribute("availability_zones", Value::string_list(["x", "y"]))
            .with_attribute("preferred_cache_cluster_azs", Value::string_list(["z"]));
        assert_eq!(resolve(&resource).unwrap().availability_zones, vec!["x", "y"]);

        let resource = base()
            .with_attribute("availability_zones", Value::List(vec![]))
            .with_attribute("preferred_cache_cluster_azs", Value::string_list(["z"]));
        assert_eq!(resolve(&resource).unwrap().availability_zones, vec!["z"]);
    }

    #[test]
    fn wrong_type_is_validation_error() {
        let resource = base().with_attribute("port", s("6379"));
        let err = resolve(&resource).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "port must be an integer");
    }

    #[test]
    fn out_of_range_integer_is_validation_error() {
        let resource = base().with_attribute("port", Value::Int(4_294_973_675));
        let err = resolve(&resource).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "port is out of range: 4294973675");

        let resource = base().with_attribute("num_cache_clusters", Value::Int(i64::MAX));
        let err = resolve(&resource).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.starts_with("num_cache_clusters is out of range"));
    }

    #[test]
    fn zero_port_means_default() {
        let resource = base().with_attribute("port", Value::Int(0));
        assert_eq!(resolve(&resource).unwrap().port, None);

        let resource = base().with_attribute("port", Value::Int(6380));
        assert_eq!(resolve(&resource).unwrap().port, Some(6380));
    }

    #[test]
    fn tags_are_collected() {
        let resource = base().with_attribute(
            "tags",
            Value::Map(HashMap::from([("env".to_string(), s("prod"))])),
        );
        let config = resolve(&resource).unwrap();
        assert_eq!(config.tags.get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn every_resolution_prefers_its_concept_name() {
        for resolution in RESOLUTIONS {
            assert_eq!(resolution.sources[0], resolution.concept);
        }
    }
}
