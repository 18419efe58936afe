// Source Model
//
// Position-exact view of topic definitions as handed over by the
// configuration-language parser. Nothing in here is interpreted yet:
// values are the literal strings the parser resolved, and every piece
// carries the range it was read from so fixes can be spliced back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in a source file.
///
/// `line` and `column` are 1-based, `byte` is the 0-based offset into the
/// file contents. Fixes are applied using `byte` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
    pub byte: usize,
}

/// A half-open range `[start, end)` in a named source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    pub filename: String,
    pub start: Pos,
    pub end: Pos,
}

impl SourceRange {
    pub fn new(filename: impl Into<String>, start: Pos, end: Pos) -> Self {
        Self {
            filename: filename.into(),
            start,
            end,
        }
    }

    /// Range covering everything from the start of `self` to the end of `other`.
    pub fn through(&self, other: &SourceRange) -> SourceRange {
        SourceRange {
            filename: self.filename.clone(),
            start: self.start,
            end: other.end,
        }
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains(&self, other: &SourceRange) -> bool {
        self.filename == other.filename
            && self.start.byte <= other.start.byte
            && other.end.byte <= self.end.byte
    }

    pub fn spans_lines(&self) -> bool {
        self.end.line > self.start.line
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{},{}-{},{}",
            self.filename, self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// The key of a config pair as the parser saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyExpr {
    /// A literal string key such as `"retention.ms"`.
    Literal(String),

    /// Any other expression (a variable reference, a function call, ...).
    /// The text is kept for diagnostics only.
    Expression(String),
}

/// One `key = value` pair of a topic's config block, before indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    pub key: KeyExpr,
    pub value: String,
    pub key_range: SourceRange,
    pub value_range: SourceRange,
}

/// A topic-level attribute such as `name` or `replication_factor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub value: String,
    /// Range of the whole `name = value` expression.
    pub range: SourceRange,
    pub value_range: SourceRange,
}

/// The `config = { ... }` attribute of a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlock {
    /// Range of the whole attribute, used to report missing keys.
    pub range: SourceRange,
    /// Range of the opening brace; new keys are inserted right after it.
    pub open_range: SourceRange,
    pub pairs: Vec<RawProperty>,
}

/// A single topic resource definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDefinition {
    /// Resource label, used to name the topic in reports.
    pub label: String,
    pub def_range: SourceRange,
    pub name: Option<Attribute>,
    pub replication_factor: Option<Attribute>,
    pub config: Option<ConfigBlock>,
}

/// A comment token from the surrounding token stream.
///
/// Line comments keep the lexer's convention: their range runs up to the
/// first column of the next line, so it includes the newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentToken {
    pub text: String,
    pub range: SourceRange,
}

/// All topics of one source file together with the file's comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub topics: Vec<TopicDefinition>,
    pub comments: Vec<CommentToken>,
}
