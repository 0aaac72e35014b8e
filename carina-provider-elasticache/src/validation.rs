//! Validation of replication group attributes
//!
//! Checks follow the naming and topology rules of the ElastiCache API so
//! that bad input fails before any request is sent.

use std::sync::LazyLock;

use regex::Regex;

use crate::resolver::DesiredConfig;

static ID_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z-]+$").expect("valid regex"));
static ID_FIRST_CHARACTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]").expect("valid regex"));

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Check a replication group id against every naming rule
///
/// All violated rules are reported, not only the first.
pub fn validate_replication_group_id(id: &str) -> Vec<ValidationError> {
    const PATH: &str = "replication_group_id";
    let mut errors = Vec::new();

    let len = id.chars().count();
    if !(1..=16).contains(&len) {
        errors.push(ValidationError::new(
            PATH,
            format!(
                "must contain from 1 to 16 alphanumeric characters or hyphens, got {:?}",
                id
            ),
        ));
    }
    if !ID_CHARACTERS.is_match(id) {
        errors.push(ValidationError::new(
            PATH,
            "only alphanumeric characters and hyphens allowed",
        ));
    }
    if !ID_FIRST_CHARACTER.is_match(id) {
        errors.push(ValidationError::new(
            PATH,
            "first character must be a lowercase letter",
        ));
    }
    if id.contains("--") {
        errors.push(ValidationError::new(
            PATH,
            "cannot contain two consecutive hyphens",
        ));
    }
    if id.ends_with('-') {
        errors.push(ValidationError::new(PATH, "cannot end with a hyphen"));
    }

    errors
}

/// Replication groups only run the redis engine
pub fn validate_engine(engine: &str) -> Vec<ValidationError> {
    if engine.eq_ignore_ascii_case("redis") {
        Vec::new()
    } else {
        vec![ValidationError::new(
            "engine",
            "the only acceptable engine for replication groups is redis",
        )]
    }
}

pub fn validate_num_cache_clusters(count: i32) -> Vec<ValidationError> {
    if (1..=5).contains(&count) {
        Vec::new()
    } else {
        vec![ValidationError::new(
            "number_cache_clusters",
            format!("must be between 1 and 5, got {}", count),
        )]
    }
}

pub fn validate_port(port: i32) -> Vec<ValidationError> {
    if (1..=65535).contains(&port) {
        Vec::new()
    } else {
        vec![ValidationError::new(
            "port",
            format!("must be between 1 and 65535, got {}", port),
        )]
    }
}

pub fn validate_snapshot_retention_limit(limit: i32) -> Vec<ValidationError> {
    if limit >= 0 {
        Vec::new()
    } else {
        vec![ValidationError::new(
            "snapshot_retention_limit",
            format!("cannot be negative, got {}", limit),
        )]
    }
}

/// Validate a resolved replication group
pub fn validate_replication_group(desired: &DesiredConfig) -> ValidationResult {
    let mut errors = validate_replication_group_id(&desired.replication_group_id);

    if let Some(engine) = &desired.engine {
        errors.extend(validate_engine(engine));
    }
    if let Some(count) = desired.number_cache_clusters {
        errors.extend(validate_num_cache_clusters(count));
    }
    if let Some(port) = desired.port {
        errors.extend(validate_port(port));
    }
    if let Some(limit) = desired.snapshot_retention_limit {
        errors.extend(validate_snapshot_retention_limit(limit));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(id: &str) -> Vec<String> {
        validate_replication_group_id(id)
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    #[test]
    fn valid_ids() {
        for id in ["a", "tf-rep-group-1", "abcdefghijklmnop", "redis0", "a-b-c"] {
            assert!(validate_replication_group_id(id).is_empty(), "{}", id);
        }
    }

    #[test]
    fn too_long() {
        let errors = messages("abcdefghijklmnopq");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("from 1 to 16"));
    }

    #[test]
    fn empty_reports_every_violated_rule() {
        let errors = messages("");
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("from 1 to 16"));
        assert!(errors[1].contains("alphanumeric characters and hyphens"));
        assert!(errors[2].contains("first character"));
    }

    #[test]
    fn invalid_characters() {
        let errors = messages("tf_group");
        assert_eq!(errors, vec!["only alphanumeric characters and hyphens allowed"]);
    }

    #[test]
    fn must_start_with_lowercase_letter() {
        assert_eq!(messages("Group"), vec!["first character must be a lowercase letter"]);
        assert_eq!(messages("1group"), vec!["first character must be a lowercase letter"]);
    }

    #[test]
    fn no_double_hyphen() {
        assert_eq!(messages("tf--group"), vec!["cannot contain two consecutive hyphens"]);
    }

    #[test]
    fn no_trailing_hyphen() {
        assert_eq!(messages("tf-group-"), vec!["cannot end with a hyphen"]);
    }

    #[test]
    fn independent_rules_all_reported() {
        // uppercase start, double hyphen, trailing hyphen and too long
        let errors = messages("Abcdefgh--ijklmno-");
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn engine_must_be_redis() {
        assert!(validate_engine("redis").is_empty());
        assert!(validate_engine("Redis").is_empty());
        assert_eq!(validate_engine("memcached").len(), 1);
    }

    #[test]
    fn cluster_count_range() {
        assert!(validate_num_cache_clusters(1).is_empty());
        assert!(validate_num_cache_clusters(5).is_empty());
        assert_eq!(validate_num_cache_clusters(6).len(), 1);
    }

    #[test]
    fn replication_group_collects_all_errors() {
        let desired = DesiredConfig {
            replication_group_id: "Bad-".to_string(),
            engine: Some("memcached".to_string()),
            number_cache_clusters: Some(9),
            ..Default::default()
        };
        let errors = validate_replication_group(&desired).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors[0].to_string(),
            "replication_group_id: first character must be a lowercase letter"
        );
    }

    #[test]
    fn port_range() {
        assert!(validate_port(1).is_empty());
        assert!(validate_port(65535).is_empty());
        assert_eq!(validate_port(65536).len(), 1);
        assert_eq!(validate_port(-1).len(), 1);
    }

    #[test]
    fn retention_limit_not_negative() {
        assert!(validate_snapshot_retention_limit(0).is_empty());
        assert_eq!(validate_snapshot_retention_limit(-1).len(), 1);
    }

    #[test]
    fn replication_group_checks_port_and_retention() {
        let desired = DesiredConfig {
            replication_group_id: "tf-cache".to_string(),
            port: Some(70000),
            snapshot_retention_limit: Some(-3),
            ..Default::default()
        };
        let paths: Vec<String> = validate_replication_group(&desired)
            .unwrap_err()
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(paths, vec!["port", "snapshot_retention_limit"]);
    }
}
