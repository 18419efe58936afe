// Attribute Index
//
// Lookup from config key to the property that defines it. Built once per
// topic at the start of a check and dropped at the end; never shared.

use std::collections::HashMap;

use crate::source::{KeyExpr, RawProperty, SourceRange};

/// A config pair whose key resolved to a literal string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub value: String,
    pub key_range: SourceRange,
    pub value_range: SourceRange,
}

impl Property {
    /// Range of the whole `key = value` pair.
    pub fn pair_range(&self) -> SourceRange {
        self.key_range.through(&self.value_range)
    }
}

/// Structural problems that make a config block impossible to index.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("config key at {range} is not a literal string: `{expression}`")]
    MalformedKey {
        expression: String,
        range: SourceRange,
    },

    #[error("config key `{key}` is defined twice: at {first} and at {second}")]
    DuplicateKey {
        key: String,
        first: SourceRange,
        second: SourceRange,
    },
}

#[derive(Debug, Default)]
pub struct AttributeIndex {
    properties: HashMap<String, Property>,
}

impl AttributeIndex {
    /// Index the pairs of one config block.
    ///
    /// Keys must be literal strings and unique within the block.
    pub fn build(pairs: &[RawProperty]) -> Result<Self, IndexError> {
        let mut properties: HashMap<String, Property> = HashMap::with_capacity(pairs.len());

        for pair in pairs {
            let key = match &pair.key {
                KeyExpr::Literal(key) => key.clone(),
                KeyExpr::Expression(expression) => {
                    return Err(IndexError::MalformedKey {
                        expression: expression.clone(),
                        range: pair.key_range.clone(),
                    })
                }
            };

            if let Some(existing) = properties.get(&key) {
                return Err(IndexError::DuplicateKey {
                    key,
                    first: existing.key_range.clone(),
                    second: pair.key_range.clone(),
                });
            }

            properties.insert(
                key.clone(),
                Property {
                    key,
                    value: pair.value.clone(),
                    key_range: pair.key_range.clone(),
                    value_range: pair.value_range.clone(),
                },
            );
        }

        Ok(Self { properties })
    }

    pub fn lookup(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
