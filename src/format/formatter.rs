use colored::{ColoredString, Colorize};

use super::{colors, record_line::FormattedRecord};
use crate::record::{DebugRecord, Token};

pub struct RecordFormatter;

impl RecordFormatter {
    pub const fn new() -> Self {
        Self
    }

    /// Renders the timestamp followed by every token in appearance order.
    pub fn format_record(&self, record: &DebugRecord) -> FormattedRecord {
        let mut line = FormattedRecord::new(Self::format_timestamp(record.timestamp));
        for token in &record.tokens {
            line.push(Self::format_token(token));
        }
        line
    }

    pub fn format_group_header(&self, key: &str, len: usize) -> FormattedRecord {
        format!("--- group for {key} ({len} records) ---")
            .color(colors::HEADER)
            .to_record_line()
    }

    fn format_timestamp(timestamp: f64) -> ColoredString {
        format!("{timestamp:.6}").color(colors::TIMESTAMP)
    }

    fn format_token(token: &Token) -> ColoredString {
        match token {
            Token::Tag(tag) => format!("[{tag}]").color(colors::TAG),
            Token::HashKey(hash) => hash.as_str().color(colors::HASH_KEY),
            Token::NumericKey(id) => id.to_string().color(colors::NUMERIC_KEY),
        }
    }
}

#[extend::ext]
impl ColoredString {
    fn to_record_line(self) -> FormattedRecord {
        FormattedRecord::new(self)
    }
}
