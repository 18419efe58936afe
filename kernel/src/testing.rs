// Test Fixtures
//
// Builds source models straight from small topic definitions, so rule
// tests can be written against real text and have their fixes applied
// back to it. Only understands the one-assignment-per-line layout the
// tests use.

use crate::check::{check_file, FileReport};
use crate::config::PolicyConfig;
use crate::fix::apply_fixes;
use crate::rules::RuleSet;
use crate::source::{
    Attribute, CommentToken, ConfigBlock, KeyExpr, Pos, RawProperty, SourceFile, SourceRange,
    TopicDefinition,
};

pub(crate) const FILE: &str = "main.tf";

struct Line<'a> {
    number: u32,
    start: usize,
    text: &'a str,
    has_newline: bool,
}

impl Line<'_> {
    fn pos(&self, col: usize) -> Pos {
        Pos {
            line: self.number,
            column: col as u32 + 1,
            byte: self.start + col,
        }
    }

    fn range(&self, from: usize, to: usize) -> SourceRange {
        SourceRange::new(FILE, self.pos(from), self.pos(to))
    }

    /// From `from` up to the start of the next line, like a lexed line comment.
    fn rest_of_line(&self, from: usize) -> SourceRange {
        let end = if self.has_newline {
            Pos {
                line: self.number + 1,
                column: 1,
                byte: self.start + self.text.len() + 1,
            }
        } else {
            self.pos(self.text.len())
        };
        SourceRange::new(FILE, self.pos(from), end)
    }
}

struct Assignment<'a> {
    key: (usize, usize, &'a str),
    key_quoted: bool,
    value: (usize, usize, &'a str),
}

fn comment_start(text: &str) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

/// `(start, end, inner)` of the next token at or after `from`. Quoted
/// tokens include their quotes in the span but not in `inner`.
fn token(text: &str, from: usize) -> Option<(usize, usize, &str)> {
    let start = from + text[from..].find(|c: char| !c.is_whitespace())?;
    let rest = &text[start..];
    if let Some(body) = rest.strip_prefix('"') {
        let close = body.find('"')?;
        Some((start, start + close + 2, &body[..close]))
    } else {
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        Some((start, start + len, &rest[..len]))
    }
}

fn assignment(code: &str) -> Option<Assignment<'_>> {
    let key = token(code, 0)?;
    let key_quoted = code[key.0..].starts_with('"');
    let eq = key.1 + code[key.1..].find('=')?;
    let value = token(code, eq + 1)?;
    Some(Assignment {
        key,
        key_quoted,
        value,
    })
}

/// Read every `kafka_topic` resource and comment of `source`.
pub(crate) fn parse(source: &str) -> SourceFile {
    let mut topics = Vec::new();
    let mut comments = Vec::new();
    let mut topic: Option<TopicDefinition> = None;
    let mut config: Option<(Pos, SourceRange, Vec<RawProperty>)> = None;

    let mut start = 0;
    for (idx, raw) in source.split_inclusive('\n').enumerate() {
        let has_newline = raw.ends_with('\n');
        let line = Line {
            number: idx as u32 + 1,
            start,
            text: raw.trim_end_matches('\n'),
            has_newline,
        };
        start += raw.len();

        let hash = comment_start(line.text);
        if let Some(hash) = hash {
            let mut text = line.text[hash..].to_string();
            if has_newline {
                text.push('\n');
            }
            comments.push(CommentToken {
                text,
                range: line.rest_of_line(hash),
            });
        }

        let code = &line.text[..hash.unwrap_or(line.text.len())];
        let trimmed = code.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = code.len() - code.trim_start().len();

        if trimmed.starts_with("resource ") {
            let kind = token(code, indent + "resource".len()).expect("resource type");
            let label = token(code, kind.1).expect("resource label");
            topic = Some(TopicDefinition {
                label: label.2.to_string(),
                def_range: line.range(indent, label.1),
                name: None,
                replication_factor: None,
                config: None,
            });
            continue;
        }

        if config.is_some() {
            if trimmed == "}" {
                if let (Some((config_start, open_range, pairs)), Some(current)) =
                    (config.take(), topic.as_mut())
                {
                    current.config = Some(ConfigBlock {
                        range: SourceRange::new(FILE, config_start, line.pos(indent + 1)),
                        open_range,
                        pairs,
                    });
                }
            } else if let (Some(a), Some((_, _, pairs))) = (assignment(code), config.as_mut()) {
                let key = if a.key_quoted {
                    KeyExpr::Literal(a.key.2.to_string())
                } else {
                    KeyExpr::Expression(a.key.2.to_string())
                };
                pairs.push(RawProperty {
                    key,
                    value: a.value.2.to_string(),
                    key_range: line.range(a.key.0, a.key.1),
                    value_range: line.range(a.value.0, a.value.1),
                });
            }
            continue;
        }

        if trimmed == "}" {
            topics.extend(topic.take());
            continue;
        }

        let Some(current) = topic.as_mut() else {
            continue;
        };

        if trimmed.starts_with("config") {
            let brace = code.find('{').expect("config block opens on its own line");
            config = Some((line.pos(indent), line.range(brace, brace + 1), Vec::new()));
            continue;
        }

        if let Some(a) = assignment(code) {
            let attribute = Attribute {
                value: a.value.2.to_string(),
                range: line.range(a.key.0, a.value.1),
                value_range: line.range(a.value.0, a.value.1),
            };
            match a.key.2 {
                "name" => current.name = Some(attribute),
                "replication_factor" => current.replication_factor = Some(attribute),
                _ => {}
            }
        }
    }

    SourceFile {
        filename: FILE.into(),
        topics,
        comments,
    }
}

/// Check `source` with the standard rule set of `policy`.
pub(crate) fn check_source(source: &str, policy: &PolicyConfig) -> FileReport {
    let file = parse(source);
    check_file(&file, &RuleSet::standard(policy), policy)
}

/// Issue messages of a single-topic source, in emission order.
pub(crate) fn messages(source: &str) -> Vec<String> {
    let report = check_source(source, &PolicyConfig::default_policy());
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    report
        .topics
        .iter()
        .flat_map(|topic| topic.issues.iter().map(|issue| issue.message.clone()))
        .collect()
}

/// Apply every fix proposed for `source` under the default policy.
pub(crate) fn fixed(source: &str) -> String {
    let report = check_source(source, &PolicyConfig::default_policy());
    apply_fixes(source, report.fixes()).expect("fixes apply cleanly")
}
