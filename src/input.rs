use std::{
    fs::File,
    io::{self, BufRead, BufReader, StdinLock},
    path::PathBuf,
};

use anyhow::anyhow;

use crate::prelude::*;

#[derive(Debug)]
pub enum DebugInput {
    File(BufReader<File>),
    Stdin(StdinLock<'static>),
}

impl DebugInput {
    /// Opens the log source for a path argument. `-` selects stdin; a
    /// leading `~/` is expanded to the home directory.
    pub fn from_path(path: &str) -> Result<Self> {
        if path == "-" {
            return Ok(Self::Stdin(io::stdin().lock()));
        }

        let path = expand_tilde(path);
        let file = File::open(&path)
            .map_err(|e| anyhow!("failed to open log file '{}': {e}", path.display()))?;
        Ok(Self::File(BufReader::new(file)))
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self, Self::Stdin(_))
    }

    pub fn lines(self) -> Box<dyn Iterator<Item = Result<String>>> {
        match self {
            Self::File(file) => Self::read_lines_from(file, "file"),
            Self::Stdin(stdin) => Self::read_lines_from(stdin, "stdin"),
        }
    }

    fn read_lines_from<'a>(
        input: impl BufRead + 'a,
        input_src: &'static str,
    ) -> Box<dyn Iterator<Item = Result<String>> + 'a> {
        let input = input
            .lines()
            .map(move |line| line.map_err(|e| anyhow!("failed to read line from {input_src}: {e}")));
        Box::new(input)
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }

    PathBuf::from(path)
}
