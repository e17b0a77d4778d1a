use colored::Color;

pub const HEADER: Color = Color::BrightBlack;
pub const PROMPT: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;

pub const TIMESTAMP: Color = Color::Magenta;
pub const TAG: Color = Color::White;
pub const HASH_KEY: Color = Color::Cyan;
pub const NUMERIC_KEY: Color = Color::Yellow;
