use anyhow::anyhow;

use crate::prelude::*;

/// One whitespace-separated token of a debug line, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `[label]` with the brackets stripped.
    Tag(String),
    /// A short-hash token, kept verbatim including its `sh` prefix.
    HashKey(String),
    /// A bare base-10 integer.
    NumericKey(i64),
}

/// The correlation keys carried by one record.
///
/// A record with neither key cannot be constructed, so the grouping engine
/// never has to reject one.
#[derive(Debug, Clone, PartialEq)]
pub enum Keys {
    Hash(String),
    Id(i64),
    Both { hash: String, id: i64 },
}

impl Keys {
    /// Derives the keys from a token sequence. When a line carries two
    /// tokens of the same kind, the later one wins.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self> {
        let mut hash = None;
        let mut id = None;

        for token in tokens {
            match token {
                Token::Tag(_) => {},
                Token::HashKey(h) => hash = Some(h.clone()),
                Token::NumericKey(i) => id = Some(*i),
            }
        }

        match (hash, id) {
            (Some(hash), Some(id)) => Ok(Self::Both { hash, id }),
            (Some(hash), None) => Ok(Self::Hash(hash)),
            (None, Some(id)) => Ok(Self::Id(id)),
            (None, None) => Err(anyhow!("line carries neither a hash key nor a numeric id")),
        }
    }
}

/// One parsed debug line: the timestamp, every classified token in
/// appearance order, and the correlation keys derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugRecord {
    pub timestamp: f64,
    pub tokens: Vec<Token>,
    pub keys: Keys,
}

impl DebugRecord {
    pub fn from_parts(timestamp: f64, tokens: Vec<Token>) -> Result<Self> {
        let keys = Keys::from_tokens(&tokens)?;
        Ok(Self {
            timestamp,
            tokens,
            keys,
        })
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Tag(tag) => Some(tag.as_str()),
            _ => None,
        })
    }
}
