// Rule Framework
//
// Rules are pure checks over one topic. They never fail: everything they
// find is reported as an issue. Structural problems are caught earlier,
// while the topic context (and its attribute index) is built.

use crate::config::PolicyConfig;
use crate::fix::Fix;
use crate::index::{AttributeIndex, IndexError};
use crate::issue::{Issue, IssueReporter};
use crate::source::{CommentToken, ConfigBlock, TopicDefinition};

pub mod cleanup;
pub mod comments;
pub mod infinite_retention;
pub mod retention;
pub mod scalar;
pub mod topic_config;

/// A topic's config block together with its index.
#[derive(Debug)]
pub struct ConfigView<'a> {
    pub block: &'a ConfigBlock,
    pub index: AttributeIndex,
}

impl ConfigView<'_> {
    /// Fix inserting `text` on a new line at the top of the block.
    pub fn insert_fix(&self, text: impl AsRef<str>) -> Fix {
        Fix::insert_after(&self.block.open_range, format!("\n{}", text.as_ref()))
    }
}

/// `"key" = "value"` as it is written inside a config block.
pub fn pair_text(key: &str, value: &str) -> String {
    format!("\"{key}\" = \"{value}\"")
}

/// Everything a rule may look at while checking one topic.
#[derive(Debug)]
pub struct TopicContext<'a> {
    pub topic: &'a TopicDefinition,
    /// `None` when the topic has no config attribute.
    pub config: Option<ConfigView<'a>>,
    pub comments: &'a [CommentToken],
    pub policy: &'a PolicyConfig,
}

impl<'a> TopicContext<'a> {
    pub fn new(
        topic: &'a TopicDefinition,
        comments: &'a [CommentToken],
        policy: &'a PolicyConfig,
    ) -> Result<Self, IndexError> {
        let config = topic
            .config
            .as_ref()
            .map(|block| {
                AttributeIndex::build(&block.pairs).map(|index| ConfigView { block, index })
            })
            .transpose()?;

        Ok(Self {
            topic,
            config,
            comments,
            policy,
        })
    }
}

/// Trait implemented by all rules.
///
/// Rules must be:
/// - Pure
/// - Deterministic
/// - Independent of the order topics are checked in
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &TopicContext<'_>, report: &mut IssueReporter);
}

/// Ordered set of rules evaluated against each topic.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rules, minus those the policy disables.
    ///
    /// Registration order is evaluation order: config checks first, then
    /// comment reconciliation, then the infinite-retention advisory.
    pub fn standard(policy: &PolicyConfig) -> Self {
        let mut rules = Self::new();
        if policy.is_rule_enabled(topic_config::NAME) {
            rules.register(topic_config::TopicConfigRule);
        }
        if policy.is_rule_enabled(comments::NAME) {
            rules.register(comments::ConfigCommentsRule);
        }
        if policy.is_rule_enabled(infinite_retention::NAME) {
            rules.register(infinite_retention::NoInfiniteRetentionRule);
        }
        rules
    }

    pub fn register<R: Rule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Run every rule against one topic, in registration order.
    pub fn evaluate(&self, ctx: &TopicContext<'_>) -> Vec<Issue> {
        let mut report = IssueReporter::new();

        for rule in &self.rules {
            report.enter(rule.name());
            let before = report.len();
            rule.check(ctx, &mut report);
            tracing::debug!(
                topic = %ctx.topic.label,
                rule = rule.name(),
                issues = report.len() - before,
                "rule evaluated"
            );
        }

        report.into_issues()
    }
}
