use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use colored::Colorize;
use regex::Regex;
use strum::IntoEnumIterator;

use crate::{
    format::{RecordFormatter, colors},
    group::{Correlator, SharedGroup},
    prelude::*,
};

const PROMPT: &str = "corrlog>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
enum Command {
    Hash,
    Id,
    Keys,
    Find,
    Stats,
    Help,
    Quit,
    Exit,
}

impl Command {
    const fn usage(self) -> &'static str {
        match self {
            Self::Hash => "hash <key>    show the group a hash key maps to",
            Self::Id => "id <n>        show the group a numeric id maps to",
            Self::Keys => "keys          list every key with its group size",
            Self::Find => "find <regex>  list keys whose group carries a matching hash key or tag",
            Self::Stats => "stats         counts of records, keys and groups",
            Self::Help => "help          this overview",
            Self::Quit => "quit          leave the session",
            Self::Exit => "exit          leave the session",
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Read-eval-print session over the finished indices.
pub struct InspectShell<'a> {
    correlator: &'a Correlator,
    formatter: RecordFormatter,
}

impl<'a> InspectShell<'a> {
    pub fn new(correlator: &'a Correlator) -> Self {
        Self {
            correlator,
            formatter: RecordFormatter::new(),
        }
    }

    pub fn run(&self) -> Result<()> {
        self.print_stats();
        println!("{}", "type 'help' for the available commands".color(colors::HEADER));

        let mut lines = io::stdin().lock().lines();
        loop {
            print!("{} ", PROMPT.color(colors::PROMPT));
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break; // EOF
            };

            if let Flow::Quit = self.dispatch(line?.trim()) {
                break;
            }
        }

        Ok(())
    }

    fn dispatch(&self, line: &str) -> Flow {
        if line.is_empty() {
            return Flow::Continue;
        }

        let (word, argument) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let argument = argument.trim();

        let Ok(command) = Command::from_str(word) else {
            warn(&format!("unknown command '{word}'; type 'help' for the list"));
            return Flow::Continue;
        };

        match command {
            Command::Hash => self.show_hash(argument),
            Command::Id => self.show_id(argument),
            Command::Keys => self.list_keys(),
            Command::Find => self.find(argument),
            Command::Stats => self.print_stats(),
            Command::Help => print_help(),
            Command::Quit | Command::Exit => return Flow::Quit,
        }

        Flow::Continue
    }

    fn show_hash(&self, key: &str) {
        if key.is_empty() {
            warn("usage: hash <key>");
            return;
        }

        match self.correlator.hash_group(key) {
            Some(group) => self.print_group(key, group),
            None => warn(&format!("no group for hash key '{key}'")),
        }
    }

    fn show_id(&self, argument: &str) {
        let Ok(id) = argument.parse::<i64>() else {
            warn("usage: id <integer>");
            return;
        };

        match self.correlator.id_group(id) {
            Some(group) => self.print_group(&id.to_string(), group),
            None => warn(&format!("no group for id {id}")),
        }
    }

    fn print_group(&self, key: &str, group: &SharedGroup) {
        let group = group.borrow();
        println!("{}", self.formatter.format_group_header(key, group.len()));
        for record in group.records() {
            println!("{}", self.formatter.format_record(record));
        }
    }

    fn list_keys(&self) {
        for key in self.correlator.hash_keys() {
            let len = self.correlator.hash_group(key).map_or(0, |g| g.borrow().len());
            println!("{} ({len} records)", key.color(colors::HASH_KEY));
        }
        for id in self.correlator.id_keys() {
            let len = self.correlator.id_group(id).map_or(0, |g| g.borrow().len());
            println!("{} ({len} records)", id.to_string().color(colors::NUMERIC_KEY));
        }
    }

    fn find(&self, pattern: &str) {
        if pattern.is_empty() {
            warn("usage: find <regex>");
            return;
        }

        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                warn(&format!("failed to compile regex: {e}"));
                return;
            },
        };

        let mut found = false;
        for key in self.correlator.hash_keys() {
            if let Some(group) = self.correlator.hash_group(key)
                && (regex.is_match(key) || group_has_matching_tag(group, &regex))
            {
                println!("hash {}", key.color(colors::HASH_KEY));
                found = true;
            }
        }
        for id in self.correlator.id_keys() {
            if let Some(group) = self.correlator.id_group(id)
                && (regex.is_match(&id.to_string()) || group_has_matching_tag(group, &regex))
            {
                println!("id   {}", id.to_string().color(colors::NUMERIC_KEY));
                found = true;
            }
        }

        if !found {
            println!("{}", "no matches".color(colors::HEADER));
        }
    }

    fn print_stats(&self) {
        println!(
            "{} records in {} groups ({} hash keys, {} ids)",
            self.correlator.records_filed(),
            self.correlator.distinct_group_count(),
            self.correlator.hash_keys().len(),
            self.correlator.id_keys().len(),
        );
    }
}

/// One-shot, non-interactive rendition of the session: stats plus keys.
pub fn print_summary(correlator: &Correlator) {
    let shell = InspectShell::new(correlator);
    shell.print_stats();
    shell.list_keys();
}

fn print_help() {
    for command in Command::iter() {
        println!("{}", command.usage());
    }
}

fn warn(message: &str) {
    eprintln!("{}", format!("warning: {message}").color(colors::WARNING));
}

fn group_has_matching_tag(group: &SharedGroup, regex: &Regex) -> bool {
    group
        .borrow()
        .records()
        .iter()
        .flat_map(|record| record.tags())
        .any(|tag| regex.is_match(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_words_parse_case_insensitively() {
        assert_eq!(Command::from_str("hash").unwrap(), Command::Hash);
        assert_eq!(Command::from_str("KEYS").unwrap(), Command::Keys);
        assert_eq!(Command::from_str("Quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_unknown_command_word_fails_to_parse() {
        assert!(Command::from_str("dump").is_err());
        assert!(Command::from_str("").is_err());
    }
}
