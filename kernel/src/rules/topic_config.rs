// Topic Config Rule
//
// The main policy over a topic definition: replication factor, presence of
// a config attribute, compression codec, cleanup policy and the retention
// and tiered-storage settings that depend on it.

use crate::issue::IssueReporter;
use crate::rules::{cleanup, retention, scalar, Rule, TopicContext};

pub const NAME: &str = "topic_config";

pub struct TopicConfigRule;

impl Rule for TopicConfigRule {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, ctx: &TopicContext<'_>, report: &mut IssueReporter) {
        scalar::check_replication_factor(ctx.topic, ctx.policy, report);

        let Some(config) = &ctx.config else {
            report.emit(
                "missing config attribute: the topic configuration must be specified in a config attribute",
                &ctx.topic.def_range,
            );
            return;
        };

        scalar::check_compression_type(config, ctx.policy, report);

        if let Some(cleanup) = cleanup::resolve(config, ctx.policy, report) {
            retention::check(cleanup, config, ctx.policy, report);
        }
    }
}
