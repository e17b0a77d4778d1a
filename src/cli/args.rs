use clap::{Parser, ValueHint};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the debug log file to load ('-' reads from stdin; a leading '~/' is expanded).
    #[arg(value_name("FILE"), value_hint(ValueHint::FilePath))]
    pub log_file: String,
}
