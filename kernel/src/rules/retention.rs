// Retention & Tiered Storage
//
// Whether tiered storage must be on, and whether a local retention may be
// set, is derived from (cleanup policy, retention time) alone. The
// derivation is a small decision table; the checks below only enforce
// whatever the table says.

use crate::config::{
    PolicyConfig, LOCAL_RETENTION_TIME_KEY, RETENTION_TIME_KEY, TIERED_STORAGE_ENABLE_KEY,
};
use crate::fix::Fix;
use crate::index::Property;
use crate::issue::IssueReporter;
use crate::rules::cleanup::CleanupPolicy;
use crate::rules::comments::canonical_text;
use crate::rules::{pair_text, ConfigView};
use crate::units::parse_integer;

pub const TIERED_STORAGE_ENABLED_VALUE: &str = "true";

/// Placeholder proposed for a missing retention time. Deliberately invalid
/// so that it cannot be applied and forgotten.
pub const RETENTION_TIME_PLACEHOLDER: &str = "???";

/// Negative retention means data never expires.
pub const fn is_infinite_retention(millis: i64) -> bool {
    millis < 0
}

/// Where a retention time sits relative to the tiered-storage threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionClass {
    Infinite,
    AtLeastThreshold,
    BelowThreshold,
}

impl RetentionClass {
    pub fn classify(millis: i64, threshold_millis: i64) -> Self {
        if is_infinite_retention(millis) {
            RetentionClass::Infinite
        } else if millis >= threshold_millis {
            RetentionClass::AtLeastThreshold
        } else {
            RetentionClass::BelowThreshold
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Forbidden,
    Unconstrained,
}

/// What a topic's config must (not) contain.
///
/// For tiered storage, `Required` means present and `"true"`, `Forbidden`
/// means absent or not `"true"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub retention: Presence,
    pub tiered_storage: Presence,
    pub local_retention: Presence,
}

/// The decision table. `retention` is `None` when no usable retention
/// time could be read.
pub fn requirements(cleanup: CleanupPolicy, retention: Option<RetentionClass>) -> Requirements {
    use Presence::*;

    let (tiered_storage, local_retention) = match (cleanup, retention) {
        (CleanupPolicy::Compact, _) => (Forbidden, Forbidden),
        (CleanupPolicy::Delete, None) => (Unconstrained, Unconstrained),
        (
            CleanupPolicy::Delete,
            Some(RetentionClass::Infinite | RetentionClass::AtLeastThreshold),
        ) => (Required, Required),
        (CleanupPolicy::Delete, Some(RetentionClass::BelowThreshold)) => (Forbidden, Forbidden),
    };

    let retention = match cleanup {
        CleanupPolicy::Delete => Required,
        CleanupPolicy::Compact => Forbidden,
    };

    Requirements {
        retention,
        tiered_storage,
        local_retention,
    }
}

/// Enforce the retention and tiered-storage requirements of a topic.
pub fn check(
    cleanup: CleanupPolicy,
    config: &ConfigView<'_>,
    policy: &PolicyConfig,
    report: &mut IssueReporter,
) {
    // `None` for a delete topic leaves the dependent properties unconstrained
    let class = match cleanup {
        CleanupPolicy::Delete => read_retention(config, policy, report),
        CleanupPolicy::Compact => None,
    };

    let required = requirements(cleanup, class);
    let reason = match cleanup {
        CleanupPolicy::Compact => "compacted topic".to_string(),
        CleanupPolicy::Delete => format!(
            "less than {} days retention",
            policy.tiered_storage_threshold_days
        ),
    };

    if required.retention == Presence::Forbidden {
        forbid_retention(config, &reason, report);
    }

    match required.tiered_storage {
        Presence::Required => require_tiered_storage(config, policy, report),
        Presence::Forbidden => forbid_tiered_storage(config, &reason, report),
        Presence::Unconstrained => {}
    }

    match required.local_retention {
        Presence::Required => require_local_retention(config, policy, report),
        Presence::Forbidden => forbid_local_retention(config, &reason, report),
        Presence::Unconstrained => {}
    }
}

fn read_retention(
    config: &ConfigView<'_>,
    policy: &PolicyConfig,
    report: &mut IssueReporter,
) -> Option<RetentionClass> {
    let Some(retention) = config.index.lookup(RETENTION_TIME_KEY) else {
        report.emit_with_fix(
            format!(
                "{RETENTION_TIME_KEY} must be defined on a topic with cleanup policy delete: \
                 replace the '{RETENTION_TIME_PLACEHOLDER}' placeholder with the retention in milliseconds"
            ),
            &config.block.range,
            config.insert_fix(pair_text(RETENTION_TIME_KEY, RETENTION_TIME_PLACEHOLDER)),
        );
        return None;
    };

    match parse_integer(&retention.value) {
        Ok(millis) => Some(RetentionClass::classify(
            millis,
            policy.tiered_storage_threshold_millis(),
        )),
        Err(_) => {
            report.emit(
                format!(
                    "{RETENTION_TIME_KEY} must have a valid integer value expressed in milliseconds. \
                     Use -1 for infinite retention"
                ),
                &retention.value_range,
            );
            None
        }
    }
}

fn is_enabled(tiered_storage: &Property) -> bool {
    tiered_storage.value == TIERED_STORAGE_ENABLED_VALUE
}

fn require_tiered_storage(config: &ConfigView<'_>, policy: &PolicyConfig, report: &mut IssueReporter) {
    let message = format!(
        "tiered storage must be enabled when retention time is at least {} days or infinite: \
         {TIERED_STORAGE_ENABLE_KEY} must be '{TIERED_STORAGE_ENABLED_VALUE}'",
        policy.tiered_storage_threshold_days
    );

    match config.index.lookup(TIERED_STORAGE_ENABLE_KEY) {
        None => report.emit_with_fix(
            message,
            &config.block.range,
            config.insert_fix(pair_text(TIERED_STORAGE_ENABLE_KEY, TIERED_STORAGE_ENABLED_VALUE)),
        ),
        Some(tiered_storage) if !is_enabled(tiered_storage) => report.emit_with_fix(
            message,
            &tiered_storage.value_range,
            Fix::replace(
                &tiered_storage.value_range,
                format!("\"{TIERED_STORAGE_ENABLED_VALUE}\""),
            ),
        ),
        Some(_) => {}
    }
}

fn forbid_tiered_storage(config: &ConfigView<'_>, reason: &str, report: &mut IssueReporter) {
    let Some(tiered_storage) = config.index.lookup(TIERED_STORAGE_ENABLE_KEY) else {
        return;
    };
    if !is_enabled(tiered_storage) {
        return;
    }

    report.emit_with_fix(
        format!("tiered storage is not supported for {reason}: removing {TIERED_STORAGE_ENABLE_KEY} ..."),
        &tiered_storage.value_range,
        Fix::delete(&tiered_storage.pair_range()),
    );
}

fn require_local_retention(config: &ConfigView<'_>, policy: &PolicyConfig, report: &mut IssueReporter) {
    let default = policy.local_retention_default_millis();

    let Some(local_retention) = config.index.lookup(LOCAL_RETENTION_TIME_KEY) else {
        let pair = pair_text(LOCAL_RETENTION_TIME_KEY, &default.to_string());
        // insert with its comment already in place
        let text = match policy.annotated(LOCAL_RETENTION_TIME_KEY) {
            Some(annotated) => format!("{}\n{pair}", canonical_text(annotated, default)),
            None => pair,
        };
        report.emit_with_fix(
            format!(
                "missing {LOCAL_RETENTION_TIME_KEY} when tiered storage is enabled: using default '{default}'"
            ),
            &config.block.range,
            config.insert_fix(text),
        );
        return;
    };

    if parse_integer(&local_retention.value).is_err() {
        report.emit(
            format!("{LOCAL_RETENTION_TIME_KEY} must have a valid integer value expressed in milliseconds"),
            &local_retention.value_range,
        );
    }
}

fn forbid_local_retention(config: &ConfigView<'_>, reason: &str, report: &mut IssueReporter) {
    let Some(local_retention) = config.index.lookup(LOCAL_RETENTION_TIME_KEY) else {
        return;
    };

    report.emit_with_fix(
        format!(
            "defining {LOCAL_RETENTION_TIME_KEY} is misleading when tiered storage is disabled due to {reason}: removing it ..."
        ),
        &local_retention.value_range,
        Fix::delete(&local_retention.pair_range()),
    );
}

fn forbid_retention(config: &ConfigView<'_>, reason: &str, report: &mut IssueReporter) {
    let Some(retention) = config.index.lookup(RETENTION_TIME_KEY) else {
        return;
    };

    report.emit_with_fix(
        format!("defining {RETENTION_TIME_KEY} is misleading for {reason}: removing it ..."),
        &retention.key_range,
        Fix::delete(&retention.pair_range()),
    );
}
