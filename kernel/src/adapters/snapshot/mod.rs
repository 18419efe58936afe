// Parser Snapshot Adapter
//
// Reads the JSON snapshot a configuration-language parser writes for each
// source file (topics, config pairs, comment tokens, all with positions)
// and turns it into the kernel's source model.

use serde::Deserialize;

use crate::source::{
    Attribute, CommentToken, ConfigBlock, KeyExpr, Pos, RawProperty, SourceFile, SourceRange,
    TopicDefinition,
};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{file}: value of `{key}` is not a literal: {value}")]
    UnsupportedValue {
        file: String,
        key: String,
        value: serde_json::Value,
    },
}

/// One snapshot document; a file or a list of files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SnapshotDocument {
    Many(Vec<SnapshotFile>),
    One(SnapshotFile),
}

#[derive(Debug, Deserialize)]
pub struct SnapshotFile {
    pub filename: String,

    #[serde(default)]
    pub topics: Vec<SnapshotTopic>,

    #[serde(default)]
    pub comments: Vec<SnapshotComment>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotRange {
    pub start: Pos,
    pub end: Pos,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotTopic {
    pub label: String,

    #[serde(rename = "def-range")]
    pub def_range: SnapshotRange,

    pub name: Option<SnapshotAttribute>,

    #[serde(rename = "replication-factor")]
    pub replication_factor: Option<SnapshotAttribute>,

    pub config: Option<SnapshotConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotAttribute {
    pub value: serde_json::Value,

    pub range: SnapshotRange,

    #[serde(rename = "value-range")]
    pub value_range: SnapshotRange,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotConfig {
    pub range: SnapshotRange,

    #[serde(rename = "open-brace")]
    pub open_brace: SnapshotRange,

    #[serde(default)]
    pub pairs: Vec<SnapshotPair>,
}

/// A key as written: a string literal, or `{"expression": "..."}` for
/// anything the parser could not resolve to one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SnapshotKey {
    Literal(String),
    Expression { expression: String },
}

#[derive(Debug, Deserialize)]
pub struct SnapshotPair {
    pub key: SnapshotKey,

    pub value: serde_json::Value,

    #[serde(rename = "key-range")]
    pub key_range: SnapshotRange,

    #[serde(rename = "value-range")]
    pub value_range: SnapshotRange,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotComment {
    pub text: String,
    pub range: SnapshotRange,
}

impl SnapshotDocument {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert into normalized source files.
    pub fn into_source_files(self) -> Result<Vec<SourceFile>, SnapshotError> {
        let files = match self {
            SnapshotDocument::Many(files) => files,
            SnapshotDocument::One(file) => vec![file],
        };
        files.into_iter().map(SnapshotFile::into_source_file).collect()
    }
}

impl SnapshotFile {
    pub fn into_source_file(self) -> Result<SourceFile, SnapshotError> {
        let filename = self.filename;
        let range = |r: SnapshotRange| SourceRange::new(filename.as_str(), r.start, r.end);
        let literal = |key: &str, value: serde_json::Value| -> Result<String, SnapshotError> {
            match value {
                serde_json::Value::String(s) => Ok(s),
                serde_json::Value::Number(n) => Ok(n.to_string()),
                serde_json::Value::Bool(b) => Ok(b.to_string()),
                other => Err(SnapshotError::UnsupportedValue {
                    file: filename.clone(),
                    key: key.to_string(),
                    value: other,
                }),
            }
        };
        let attribute = |key: &str, a: SnapshotAttribute| -> Result<Attribute, SnapshotError> {
            Ok(Attribute {
                value: literal(key, a.value)?,
                range: range(a.range),
                value_range: range(a.value_range),
            })
        };

        let mut topics = Vec::with_capacity(self.topics.len());
        for topic in self.topics {
            let config = match topic.config {
                Some(config) => {
                    let mut pairs = Vec::with_capacity(config.pairs.len());
                    for pair in config.pairs {
                        let key = match pair.key {
                            SnapshotKey::Literal(key) => KeyExpr::Literal(key),
                            SnapshotKey::Expression { expression } => KeyExpr::Expression(expression),
                        };
                        let key_name = match &key {
                            KeyExpr::Literal(name) | KeyExpr::Expression(name) => name.clone(),
                        };
                        pairs.push(RawProperty {
                            value: literal(&key_name, pair.value)?,
                            key,
                            key_range: range(pair.key_range),
                            value_range: range(pair.value_range),
                        });
                    }
                    Some(ConfigBlock {
                        range: range(config.range),
                        open_range: range(config.open_brace),
                        pairs,
                    })
                }
                None => None,
            };

            topics.push(TopicDefinition {
                def_range: range(topic.def_range),
                name: topic.name.map(|a| attribute("name", a)).transpose()?,
                replication_factor: topic
                    .replication_factor
                    .map(|a| attribute("replication_factor", a))
                    .transpose()?,
                config,
                label: topic.label,
            });
        }

        let comments = self
            .comments
            .into_iter()
            .map(|comment| CommentToken {
                text: comment.text,
                range: range(comment.range),
            })
            .collect();

        Ok(SourceFile {
            filename: filename.clone(),
            topics,
            comments,
        })
    }
}
