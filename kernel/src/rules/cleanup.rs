// Cleanup Policy Resolution
//
// Reads `cleanup.policy` and resolves the effective policy the retention
// rule branches on. An unsupported value stops the retention checks for
// the topic: nothing downstream can be decided without a valid policy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{PolicyConfig, CLEANUP_POLICY_KEY};
use crate::index::AttributeIndex;
use crate::issue::IssueReporter;
use crate::rules::{pair_text, ConfigView};

/// Supported cleanup policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPolicy {
    /// Time/size bounded deletion of old segments.
    Delete,

    /// Keep only the latest record per key.
    Compact,
}

impl CleanupPolicy {
    pub const ALL: [CleanupPolicy; 2] = [CleanupPolicy::Delete, CleanupPolicy::Compact];

    pub fn as_str(self) -> &'static str {
        match self {
            CleanupPolicy::Delete => "delete",
            CleanupPolicy::Compact => "compact",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|policy| policy.as_str() == raw)
    }
}

impl fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cleanup policy as found in a topic's config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupState {
    /// Not set: the default applies.
    Unset,

    /// Set to a supported value.
    Set(CleanupPolicy),

    /// Set to anything else.
    Invalid(String),
}

impl CleanupState {
    pub fn read(index: &AttributeIndex) -> Self {
        match index.lookup(CLEANUP_POLICY_KEY) {
            None => CleanupState::Unset,
            Some(property) => match CleanupPolicy::parse(&property.value) {
                Some(policy) => CleanupState::Set(policy),
                None => CleanupState::Invalid(property.value.clone()),
            },
        }
    }

    /// The policy in effect, or `None` when the configured value is invalid.
    pub fn effective(&self, default: CleanupPolicy) -> Option<CleanupPolicy> {
        match self {
            CleanupState::Unset => Some(default),
            CleanupState::Set(policy) => Some(*policy),
            CleanupState::Invalid(_) => None,
        }
    }
}

/// Resolve the effective cleanup policy, reporting a missing or invalid one.
pub fn resolve(
    config: &ConfigView<'_>,
    policy: &PolicyConfig,
    report: &mut IssueReporter,
) -> Option<CleanupPolicy> {
    let default = policy.cleanup_policy_default;
    let state = CleanupState::read(&config.index);

    match &state {
        CleanupState::Unset => report.emit_with_fix(
            format!("missing {CLEANUP_POLICY_KEY}: using default '{default}'"),
            &config.block.range,
            config.insert_fix(pair_text(CLEANUP_POLICY_KEY, default.as_str())),
        ),
        CleanupState::Invalid(value) => {
            let allowed: Vec<&str> = CleanupPolicy::ALL.iter().map(|p| p.as_str()).collect();
            let range = config
                .index
                .lookup(CLEANUP_POLICY_KEY)
                .map_or(&config.block.range, |property| &property.value_range);
            report.emit(
                format!(
                    "invalid {CLEANUP_POLICY_KEY}: it must be one of [{}], but currently is '{value}'",
                    allowed.join(", ")
                ),
                range,
            );
        }
        CleanupState::Set(_) => {}
    }

    state.effective(default)
}
