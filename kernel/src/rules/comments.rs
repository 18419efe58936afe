// Config Comments
//
// Numeric config values are hard to read, so each annotated property must
// carry a comment spelling its value out ("# keep data for 1 day"). The
// comment sits either after the value on the same line or alone on the
// line above the key. Missing comments are added, stale ones rewritten.

use std::collections::HashSet;

use crate::config::AnnotatedProperty;
use crate::fix::Fix;
use crate::index::Property;
use crate::issue::IssueReporter;
use crate::rules::{Rule, TopicContext};
use crate::source::{CommentToken, SourceRange};
use crate::units::{describe, matches_canonical, parse_integer};

pub const NAME: &str = "topic_config_comments";

/// The comment an annotated property with value `value` must carry.
pub fn canonical_text(annotated: &AnnotatedProperty, value: i64) -> String {
    format!(
        "# {} {}",
        annotated.base_phrase,
        describe(annotated.kind, value, annotated.infinite_sentinel)
    )
}

/// Locate the comment bound to `property`.
///
/// A comment after the value on the key's line wins. Otherwise a comment
/// ending on the key's line counts, unless its own line is `occupied` by
/// some other piece of config (another key, the block opening).
pub fn find_annotation<'c>(
    comments: &'c [CommentToken],
    property: &Property,
    occupied: &HashSet<u32>,
) -> Option<&'c CommentToken> {
    let key_line = property.key_range.start.line;
    let in_file = |comment: &&CommentToken| comment.range.filename == property.key_range.filename;

    let same_line = comments.iter().filter(in_file).find(|comment| {
        comment.range.start.line == key_line
            && comment.range.start.byte >= property.value_range.end.byte
    });
    if same_line.is_some() {
        return same_line;
    }

    comments.iter().filter(in_file).find(|comment| {
        let line = comment.range.start.line;
        line + 1 == key_line && comment.range.end.line <= key_line && !occupied.contains(&line)
    })
}

/// What [`reconcile`] found wrong with one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub range: SourceRange,
    pub fix: Option<Fix>,
}

/// Compare a property's comment against its canonical text.
pub fn reconcile(
    property: &Property,
    annotated: &AnnotatedProperty,
    annotation: Option<&CommentToken>,
) -> Option<Finding> {
    let key = &property.key;

    let canonical = match parse_integer(&property.value) {
        Ok(value) => canonical_text(annotated, value),
        Err(_) if annotated.owns_validity => {
            return Some(Finding {
                message: format!(
                    "{key} must have a valid integer value expressed in {}",
                    annotated.kind.unit_name()
                ),
                range: property.value_range.clone(),
                fix: None,
            });
        }
        // reported by whichever rule owns the value
        Err(_) => return None,
    };

    match annotation {
        None => Some(Finding {
            message: format!("{key} must have a comment with the human readable value: adding it ..."),
            range: property.key_range.clone(),
            fix: Some(Fix::insert_after(&property.value_range, format!(" {canonical}"))),
        }),
        Some(comment) if !matches_canonical(&comment.text, &canonical) => {
            let text = if comment.range.spans_lines() {
                format!("{canonical}\n")
            } else {
                canonical
            };
            Some(Finding {
                message: format!(
                    "{key} value doesn't correspond to the human readable value in the comment: fixing it ..."
                ),
                range: comment.range.clone(),
                fix: Some(Fix::replace(&comment.range, text)),
            })
        }
        Some(_) => None,
    }
}

pub struct ConfigCommentsRule;

impl Rule for ConfigCommentsRule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, ctx: &TopicContext<'_>, report: &mut IssueReporter) {
        let Some(config) = &ctx.config else {
            return;
        };

        let mut occupied: HashSet<u32> = config
            .index
            .properties()
            .map(|property| property.key_range.start.line)
            .collect();
        occupied.insert(config.block.open_range.start.line);

        for annotated in &ctx.policy.annotated_properties {
            let Some(property) = config.index.lookup(&annotated.key) else {
                continue;
            };
            if report.deletes(&property.pair_range()) {
                continue;
            }

            let annotation = find_annotation(ctx.comments, property, &occupied);
            if let Some(finding) = reconcile(property, annotated, annotation) {
                match finding.fix {
                    Some(fix) => report.emit_with_fix(finding.message, &finding.range, fix),
                    None => report.emit(finding.message, &finding.range),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::testing::{check_source, fixed, messages};
    use proptest::prelude::*;

    fn topic(config_lines: &str) -> String {
        format!(
            r#"
resource "kafka_topic" "topic_def" {{
  name               = "topic_def"
  replication_factor = 3
  config = {{
    "cleanup.policy"   = "delete"
    "compression.type" = "zstd"
{config_lines}
  }}
}}"#
        )
    }

    fn annotated(key: &str) -> AnnotatedProperty {
        PolicyConfig::default_policy()
            .annotated(key)
            .cloned()
            .unwrap()
    }

    #[test]
    fn canonical_text_per_kind() {
        assert_eq!(
            canonical_text(&annotated("retention.ms"), 86_400_000),
            "# keep data for 1 day"
        );
        assert_eq!(canonical_text(&annotated("retention.ms"), -1), "# keep data forever");
        assert_eq!(
            canonical_text(&annotated("local.retention.ms"), -2),
            "# keep data in primary storage forever"
        );
        assert_eq!(
            canonical_text(&annotated("max.message.bytes"), 3 * 1024 * 1024),
            "# allow for a batch of records maximum 3MB"
        );
        assert_eq!(
            canonical_text(&annotated("retention.bytes"), -1),
            "# keep on each partition unlimited data"
        );
    }

    #[test]
    fn missing_comment_is_appended_after_the_value() {
        let source = topic(r#"    "retention.ms"     = "86400000""#);

        assert_eq!(
            messages(&source),
            vec!["retention.ms must have a comment with the human readable value: adding it ..."]
        );
        assert!(fixed(&source).contains("\"retention.ms\"     = \"86400000\" # keep data for 1 day\n"));
    }

    #[test]
    fn stale_comment_on_the_same_line_is_rewritten() {
        let source = topic(r#"    "retention.ms"     = "172800000" # keep data for 1 day"#);

        assert_eq!(
            messages(&source),
            vec!["retention.ms value doesn't correspond to the human readable value in the comment: fixing it ..."]
        );
        assert!(fixed(&source).contains("\"retention.ms\"     = \"172800000\" # keep data for 2 days\n  }"));
    }

    #[test]
    fn comment_on_the_previous_line_is_accepted() {
        let source = topic(
            r#"    # keep data for 2 days
    "retention.ms"     = "172800000""#,
        );

        assert!(messages(&source).is_empty());
    }

    #[test]
    fn stale_comment_on_the_previous_line_is_rewritten_in_place() {
        let source = topic(
            r#"    # keep data for a while
    "retention.ms"     = "172800000""#,
        );

        assert_eq!(messages(&source).len(), 1);
        assert!(fixed(&source).contains(
            "    # keep data for 2 days\n    \"retention.ms\"     = \"172800000\""
        ));
    }

    #[test]
    fn comment_of_the_line_above_belongs_to_its_own_property() {
        let source = topic(
            r#"    "retention.bytes"  = "1073741824" # keep on each partition 1GB
    "retention.ms"     = "172800000""#,
        );

        assert_eq!(
            messages(&source),
            vec!["retention.ms must have a comment with the human readable value: adding it ..."]
        );
    }

    #[test]
    fn infinite_sentinel_reads_forever() {
        let source = topic(
            r#"    "retention.ms"     = "172800000" # keep data for 2 days
    "retention.bytes"  = "-1""#,
        );

        assert!(fixed(&source).contains("\"retention.bytes\"  = \"-1\" # keep on each partition unlimited data"));
    }

    #[test]
    fn extreme_sizes_are_spelled_out_exactly() {
        let source = topic(
            r#"    "retention.ms"     = "172800000" # keep data for 2 days
    "retention.bytes"  = "-9223372036854775808" # keep on each partition 0B"#,
        );

        assert_eq!(messages(&source).len(), 1);
        assert!(fixed(&source).contains("# keep on each partition -9223372036854775808B\n"));
    }

    #[test]
    fn owned_invalid_values_are_reported_without_fix() {
        let source = topic(
            r#"    "retention.ms"          = "172800000" # keep data for 2 days
    "max.compaction.lag.ms" = "soon"
    "max.message.bytes"     = "1MB""#,
        );

        assert_eq!(
            messages(&source),
            vec![
                "max.compaction.lag.ms must have a valid integer value expressed in milliseconds",
                "max.message.bytes must have a valid integer value expressed in bytes",
            ]
        );
        assert_eq!(fixed(&source), source);
    }

    #[test]
    fn retention_validity_is_left_to_the_config_rule() {
        let finding = reconcile(
            &crate::index::Property {
                key: "retention.ms".into(),
                value: "???".into(),
                key_range: SourceRange::new(
                    "main.tf",
                    crate::source::Pos { line: 1, column: 1, byte: 0 },
                    crate::source::Pos { line: 1, column: 15, byte: 14 },
                ),
                value_range: SourceRange::new(
                    "main.tf",
                    crate::source::Pos { line: 1, column: 18, byte: 17 },
                    crate::source::Pos { line: 1, column: 23, byte: 22 },
                ),
            },
            &annotated("retention.ms"),
            None,
        );
        assert_eq!(finding, None);
    }

    #[test]
    fn properties_about_to_be_deleted_are_skipped() {
        // compacted topics lose their retention time: no point commenting it
        let source = r#"
resource "kafka_topic" "topic_def" {
  name               = "topic_def"
  replication_factor = 3
  config = {
    "cleanup.policy"   = "compact"
    "compression.type" = "zstd"
    "retention.ms"     = "604800000"
  }
}"#;

        let report = check_source(source, &PolicyConfig::default_policy());
        assert!(report.topics[0].issues.iter().all(|issue| issue.rule != NAME));
    }

    #[test]
    fn fixing_comments_is_idempotent() {
        let source = topic(
            r#"    # keep data for a while
    "retention.ms"          = "172800000"
    "max.message.bytes"     = "3145728"
    "max.compaction.lag.ms" = "5184000000" # too long"#,
        );

        assert_eq!(messages(&source).len(), 3);
        let once = fixed(&source);
        assert!(messages(&once).is_empty(), "{once}");
        assert_eq!(fixed(&once), once);
    }

    proptest! {
        #[test]
        fn any_size_comment_converges_in_one_pass(bytes in -1i64..(64i64 << 30)) {
            let source = topic(&format!(
                "    \"retention.ms\"     = \"172800000\" # keep data for 2 days\n    \"retention.bytes\"  = \"{bytes}\""
            ));

            let once = fixed(&source);
            prop_assert!(messages(&once).is_empty(), "{}", once);
        }
    }
}
