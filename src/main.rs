use crate::prelude::*;

mod cli;
mod format;
mod group;
mod input;
mod parse;
mod prelude;
mod record;
mod shell;

fn main() -> Result<()> {
    cli::run()
}
