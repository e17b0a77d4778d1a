use anyhow::anyhow;
use chumsky::prelude::*;

use crate::{
    prelude::*,
    record::{DebugRecord, Token},
};

/// Marker splitting the timestamp prefix from the token list.
pub const DEBUG_MARKER: &str = " [Debug] ";

/// Prefix identifying short-hash tokens (`sh` + hex digest).
pub const HASH_PREFIX: &str = "sh";

type ParserErr<'src> = extra::Err<Rich<'src, char>>;

pub struct DebugLineParser;

impl DebugLineParser {
    pub const fn new() -> Self {
        Self
    }

    /// The skip filter: a line qualifies for parsing iff it contains the
    /// debug marker exactly once and exactly two `[` characters (one of
    /// which belongs to the marker itself).
    pub fn recognizes(&self, line: &str) -> bool {
        line.match_indices(DEBUG_MARKER).count() == 1 && line.matches('[').count() == 2
    }

    /// Parses a recognized, trimmed line. Failures here abort the whole
    /// pass; `recognizes` is the only benign way to drop a line.
    pub fn parse_line(&self, line: &str) -> Result<DebugRecord> {
        debug_line_parser().parse(line).into_result().map_err(|errors| {
            anyhow!(
                "failed to parse debug line: {}",
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            )
        })
    }
}

fn debug_line_parser<'src>() -> impl Parser<'src, &'src str, DebugRecord, ParserErr<'src>> {
    timestamp_parser()
        .then_ignore(just(DEBUG_MARKER))
        .then(token_parser().padded().repeated().at_least(1).collect::<Vec<_>>())
        .then_ignore(end())
        .try_map(|(timestamp, tokens), span| {
            DebugRecord::from_parts(timestamp, tokens).map_err(|e| Rich::custom(span, e))
        })
}

/// Everything before the marker, parsed as seconds.
fn timestamp_parser<'src>() -> impl Parser<'src, &'src str, f64, ParserErr<'src>> {
    any()
        .and_is(just(DEBUG_MARKER).not())
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(|s: &str, span| s.parse::<f64>().map_err(|e| Rich::custom(span, e)))
}

fn token_parser<'src>() -> impl Parser<'src, &'src str, Token, ParserErr<'src>> {
    any()
        .filter(|c: &char| !c.is_whitespace())
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(|token: &str, span| classify_token(token).map_err(|e| Rich::custom(span, e)))
}

/// Classifies one whitespace-separated token by shape.
pub fn classify_token(token: &str) -> Result<Token> {
    if let Some(tag) = token.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return Ok(Token::Tag(tag.to_owned()));
    }

    if token.starts_with(HASH_PREFIX) {
        return Ok(Token::HashKey(token.to_owned()));
    }

    token
        .parse::<i64>()
        .map(Token::NumericKey)
        .map_err(|_| anyhow!("token '{token}' is neither a tag, a hash key, nor an integer"))
}
