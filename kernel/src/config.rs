// Policy Configuration
//
// Every named constant the rules depend on lives here, so the thresholds
// that gate several checks at once are defined exactly once.

use serde::{Deserialize, Serialize};

use crate::rules::cleanup::CleanupPolicy;
use crate::units::{QuantityKind, MILLIS_IN_ONE_DAY};

pub const RETENTION_TIME_KEY: &str = "retention.ms";
pub const LOCAL_RETENTION_TIME_KEY: &str = "local.retention.ms";
pub const TIERED_STORAGE_ENABLE_KEY: &str = "remote.storage.enable";
pub const CLEANUP_POLICY_KEY: &str = "cleanup.policy";
pub const COMPRESSION_TYPE_KEY: &str = "compression.type";
pub const REPLICATION_FACTOR_ATTR: &str = "replication_factor";

/// A numeric config property that must carry a human-readable comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedProperty {
    pub key: String,
    pub kind: QuantityKind,
    /// Leading words of the comment, e.g. "keep data".
    pub base_phrase: String,
    /// Value rendered as "forever" / "unlimited data" instead of a magnitude.
    #[serde(default)]
    pub infinite_sentinel: Option<i64>,
    /// Whether the comment rule reports a non-numeric value for this key.
    /// When false, another rule owns that diagnostic.
    #[serde(default)]
    pub owns_validity: bool,
}

impl AnnotatedProperty {
    fn new(
        key: &str,
        kind: QuantityKind,
        base_phrase: &str,
        infinite_sentinel: Option<i64>,
        owns_validity: bool,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            base_phrase: base_phrase.into(),
            infinite_sentinel,
            owns_validity,
        }
    }
}

/// Rejected policy files.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("malformed policy: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be a positive number of days, got {value}")]
    NonPositiveDays { field: &'static str, value: i64 },

    #[error("{field} of {value} days is too large to express in milliseconds")]
    DaysOutOfRange { field: &'static str, value: i64 },
}

/// Policy configuration loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub replication_factor: i64,
    pub compression_type: String,
    pub cleanup_policy_default: CleanupPolicy,
    /// Retention (in days) from which tiered storage becomes mandatory.
    pub tiered_storage_threshold_days: i64,
    /// Local retention proposed when tiered storage is enabled without one.
    pub local_retention_default_days: i64,
    pub annotated_properties: Vec<AnnotatedProperty>,
    /// Names of rules that must not run.
    pub disabled_rules: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::default_policy()
    }
}

impl PolicyConfig {
    /// Default built-in policy (used if no config is provided).
    pub fn default_policy() -> Self {
        Self {
            replication_factor: 3,
            compression_type: "zstd".into(),
            cleanup_policy_default: CleanupPolicy::Delete,
            tiered_storage_threshold_days: 3,
            local_retention_default_days: 1,
            annotated_properties: vec![
                AnnotatedProperty::new(
                    RETENTION_TIME_KEY,
                    QuantityKind::Duration,
                    "keep data",
                    Some(-1),
                    false,
                ),
                AnnotatedProperty::new(
                    LOCAL_RETENTION_TIME_KEY,
                    QuantityKind::Duration,
                    "keep data in primary storage",
                    Some(-2),
                    false,
                ),
                AnnotatedProperty::new(
                    "max.compaction.lag.ms",
                    QuantityKind::Duration,
                    "allow not compacted keys maximum",
                    None,
                    true,
                ),
                AnnotatedProperty::new(
                    "max.message.bytes",
                    QuantityKind::Bytes,
                    "allow for a batch of records maximum",
                    None,
                    true,
                ),
                AnnotatedProperty::new(
                    "retention.bytes",
                    QuantityKind::Bytes,
                    "keep on each partition",
                    Some(-1),
                    true,
                ),
            ],
            disabled_rules: Vec::new(),
        }
    }

    /// Parse and validate a policy file.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Day counts must be positive and convertible to milliseconds.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let days = [
            ("tiered_storage_threshold_days", self.tiered_storage_threshold_days),
            ("local_retention_default_days", self.local_retention_default_days),
        ];
        for (field, value) in days {
            if value <= 0 {
                return Err(PolicyError::NonPositiveDays { field, value });
            }
            if value.checked_mul(MILLIS_IN_ONE_DAY).is_none() {
                return Err(PolicyError::DaysOutOfRange { field, value });
            }
        }
        Ok(())
    }

    pub fn tiered_storage_threshold_millis(&self) -> i64 {
        self.tiered_storage_threshold_days
            .saturating_mul(MILLIS_IN_ONE_DAY)
    }

    pub fn local_retention_default_millis(&self) -> i64 {
        self.local_retention_default_days
            .saturating_mul(MILLIS_IN_ONE_DAY)
    }

    pub fn annotated(&self, key: &str) -> Option<&AnnotatedProperty> {
        self.annotated_properties.iter().find(|p| p.key == key)
    }

    pub fn is_rule_enabled(&self, name: &str) -> bool {
        !self.disabled_rules.iter().any(|disabled| disabled == name)
    }
}
