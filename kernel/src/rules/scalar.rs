// Scalar Checks
//
// Presence and equality checks on single values: the replication factor
// and the compression codec. No cross-field dependency.

use crate::config::{PolicyConfig, COMPRESSION_TYPE_KEY, REPLICATION_FACTOR_ATTR};
use crate::fix::Fix;
use crate::issue::IssueReporter;
use crate::rules::{pair_text, ConfigView};
use crate::source::TopicDefinition;
use crate::units::parse_integer;

pub fn check_replication_factor(
    topic: &TopicDefinition,
    policy: &PolicyConfig,
    report: &mut IssueReporter,
) {
    let expected = policy.replication_factor;
    let attribute_text = format!("{REPLICATION_FACTOR_ATTR} = {expected}");

    let Some(attribute) = &topic.replication_factor else {
        let message = format!("missing {REPLICATION_FACTOR_ATTR}: it must be equal to '{expected}'");
        match &topic.name {
            // the replication factor goes right after the name
            Some(name) => report.emit_with_fix(
                message,
                &topic.def_range,
                Fix::insert_after(&name.range, format!("\n{attribute_text}")),
            ),
            None => report.emit(message, &topic.def_range),
        }
        return;
    };

    if parse_integer(&attribute.value).ok() != Some(expected) {
        report.emit_with_fix(
            format!("the {REPLICATION_FACTOR_ATTR} must be equal to '{expected}'"),
            &attribute.range,
            Fix::replace(&attribute.range, attribute_text),
        );
    }
}

pub fn check_compression_type(
    config: &ConfigView<'_>,
    policy: &PolicyConfig,
    report: &mut IssueReporter,
) {
    let expected = policy.compression_type.as_str();

    match config.index.lookup(COMPRESSION_TYPE_KEY) {
        None => report.emit_with_fix(
            format!("missing {COMPRESSION_TYPE_KEY}: it must be equal to '{expected}'"),
            &config.block.range,
            config.insert_fix(pair_text(COMPRESSION_TYPE_KEY, expected)),
        ),
        Some(property) if property.value != expected => report.emit_with_fix(
            format!("the {COMPRESSION_TYPE_KEY} value must be equal to '{expected}'"),
            &property.value_range,
            Fix::replace(&property.value_range, format!("\"{expected}\"")),
        ),
        Some(_) => {}
    }
}
