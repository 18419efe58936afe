// No Infinite Retention
//
// Advisory only: infinite retention is allowed by the config rule, but it
// is rarely what a topic needs. Teams that do need it disable this rule.

use crate::config::RETENTION_TIME_KEY;
use crate::issue::IssueReporter;
use crate::rules::retention::is_infinite_retention;
use crate::rules::{Rule, TopicContext};
use crate::units::parse_integer;

pub const NAME: &str = "topic_no_infinite_retention";

pub struct NoInfiniteRetentionRule;

impl Rule for NoInfiniteRetentionRule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, ctx: &TopicContext<'_>, report: &mut IssueReporter) {
        let Some(config) = &ctx.config else {
            return;
        };
        let Some(retention) = config.index.lookup(RETENTION_TIME_KEY) else {
            return;
        };
        if report.deletes(&retention.pair_range()) {
            return;
        }

        // non-numeric values belong to the config rule
        let Ok(millis) = parse_integer(&retention.value) else {
            return;
        };

        if is_infinite_retention(millis) {
            report.emit(
                format!(
                    "{RETENTION_TIME_KEY} is set to infinite retention, which is NOT recommended. \
                     Please check if a compacted topic fits your use case, otherwise consider a database \
                     for long term storage. If infinite retention is really needed, disable the \
                     '{NAME}' rule for this project."
                ),
                &retention.value_range,
            );
        }
    }
}
