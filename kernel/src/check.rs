// Topic Checking Pipeline
//
// Runs a rule set over every topic of a source file:
// source → attribute index → rules → issues (+ fixes)
//
// A structural problem in one topic aborts that topic only; the others
// are still checked.

use serde::Serialize;

use crate::config::PolicyConfig;
use crate::fix::Fix;
use crate::index::IndexError;
use crate::issue::Issue;
use crate::rules::{RuleSet, TopicContext};
use crate::source::{CommentToken, SourceFile, TopicDefinition};

/// Issues found on one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicReport {
    pub topic: String,
    pub issues: Vec<Issue>,
}

impl TopicReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn fixes(&self) -> impl Iterator<Item = &Fix> {
        self.issues.iter().filter_map(|issue| issue.fix.as_ref())
    }
}

/// Errors that stop a topic from being checked.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("topic `{topic}` cannot be checked: {source}")]
    Structure {
        topic: String,
        #[source]
        source: IndexError,
    },
}

/// Check a single topic.
///
/// This function is:
/// - deterministic
/// - side-effect free
/// - independent of any other topic
pub fn check_topic(
    topic: &TopicDefinition,
    comments: &[CommentToken],
    rules: &RuleSet,
    policy: &PolicyConfig,
) -> Result<TopicReport, CheckError> {
    let ctx = TopicContext::new(topic, comments, policy).map_err(|source| CheckError::Structure {
        topic: topic.label.clone(),
        source,
    })?;

    Ok(TopicReport {
        topic: topic.label.clone(),
        issues: rules.evaluate(&ctx),
    })
}

/// Outcome of checking every topic of a file.
#[derive(Debug, Default)]
pub struct FileReport {
    pub filename: String,
    pub topics: Vec<TopicReport>,
    pub errors: Vec<CheckError>,
}

impl FileReport {
    pub fn issue_count(&self) -> usize {
        self.topics.iter().map(|topic| topic.issues.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.topics.iter().all(TopicReport::is_clean)
    }

    pub fn fixes(&self) -> impl Iterator<Item = &Fix> {
        self.topics.iter().flat_map(TopicReport::fixes)
    }
}

pub fn check_file(file: &SourceFile, rules: &RuleSet, policy: &PolicyConfig) -> FileReport {
    let mut report = FileReport {
        filename: file.filename.clone(),
        ..FileReport::default()
    };

    for topic in &file.topics {
        match check_topic(topic, &file.comments, rules, policy) {
            Ok(topic_report) => {
                tracing::debug!(
                    file = %file.filename,
                    topic = %topic_report.topic,
                    issues = topic_report.issues.len(),
                    "topic checked"
                );
                report.topics.push(topic_report);
            }
            Err(err) => {
                tracing::warn!(file = %file.filename, error = %err, "topic skipped");
                report.errors.push(err);
            }
        }
    }

    report
}
