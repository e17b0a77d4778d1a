use anyhow::anyhow;
use clap::Parser;

use super::Args;
use crate::{
    group::Correlator,
    input::DebugInput,
    parse::DebugLineParser,
    prelude::*,
    shell::{self, InspectShell},
};

pub fn run() -> Result<()> {
    let args = Args::parse();
    let input = DebugInput::from_path(&args.log_file)?;

    // The shell reads stdin, so it only makes sense when the log came
    // from a file and a terminal is attached.
    let interactive = !input.is_stdin() && atty::is(atty::Stream::Stdin);

    let correlator = ingest(input.lines())?;

    if interactive {
        InspectShell::new(&correlator).run()
    } else {
        shell::print_summary(&correlator);
        Ok(())
    }
}

/// One pass over the input: recognized lines are parsed and filed, every
/// other line is dropped. The first malformed recognized line aborts.
fn ingest(lines: impl Iterator<Item = Result<String>>) -> Result<Correlator> {
    let parser = DebugLineParser::new();
    let mut correlator = Correlator::new();

    for line in lines {
        let line = line?;
        let line = line.trim();
        if !parser.recognizes(line) {
            continue;
        }

        let record = parser
            .parse_line(line)
            .map_err(|e| anyhow!("aborting at line '{line}': {e}"))?;
        correlator.file(record);
    }

    Ok(correlator)
}
