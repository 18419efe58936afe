// Issue Reporting
//
// Collects the diagnostics produced while checking one topic. Issues are
// plain output values: once emitted they are never touched again.

use serde::Serialize;

use crate::fix::Fix;
use crate::source::SourceRange;

/// A single policy violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Name of the rule that produced the issue.
    pub rule: &'static str,
    pub message: String,
    pub range: SourceRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

/// Per-topic issue buffer shared by all rules of a rule set.
///
/// Rules run in a fixed order against the same reporter, which lets a later
/// rule see what an earlier one already decided (for instance that a
/// property is about to be deleted) and avoid reporting the same root cause
/// twice.
#[derive(Debug)]
pub struct IssueReporter {
    rule: &'static str,
    issues: Vec<Issue>,
}

impl Default for IssueReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueReporter {
    pub fn new() -> Self {
        Self {
            rule: "unnamed",
            issues: Vec::new(),
        }
    }

    /// Attribute subsequent issues to `rule`.
    pub fn enter(&mut self, rule: &'static str) {
        self.rule = rule;
    }

    pub fn emit(&mut self, message: impl Into<String>, range: &SourceRange) {
        self.push(message.into(), range, None);
    }

    pub fn emit_with_fix(&mut self, message: impl Into<String>, range: &SourceRange, fix: Fix) {
        self.push(message.into(), range, Some(fix));
    }

    fn push(&mut self, message: String, range: &SourceRange, fix: Option<Fix>) {
        tracing::trace!(rule = self.rule, %range, %message, "issue emitted");
        self.issues.push(Issue {
            rule: self.rule,
            message,
            range: range.clone(),
            fix,
        });
    }

    /// Whether a fix emitted so far deletes the text covered by `range`.
    pub fn deletes(&self, range: &SourceRange) -> bool {
        self.issues
            .iter()
            .filter_map(|issue| issue.fix.as_ref()?.deleted_range())
            .any(|deleted| deleted.contains(range))
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}
