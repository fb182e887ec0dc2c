//! CLI argument definitions for the EAD exporter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ead-export",
    version,
    about = "Export archival description records as EAD 2002 finding aids",
    long_about = "Export a resolved archival description record as an EAD 2002 finding aid.\n\n\
                  The record is read as JSON; the document is streamed to a file or stdout.\n\
                  Failing components are replaced by a diagnostic note and reported in a summary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serialize a record to EAD.
    Export(ExportArgs),

    /// Check a file or fragment for well-formedness.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Resolved record as JSON.
    #[arg(value_name = "RECORD_JSON")]
    pub record: PathBuf,

    /// TOML file with export options and label tables.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Include content marked unpublished, tagged `audience="internal"`.
    #[arg(long = "include-unpublished")]
    pub include_unpublished: bool,

    /// Export digital objects on components.
    #[arg(long = "include-daos")]
    pub include_daos: bool,

    /// Use `c01`…`c12` instead of `c`.
    #[arg(long = "numbered-c-tags")]
    pub numbered_c_tags: bool,

    /// Prefix for generated and stored element ids.
    #[arg(long = "id-prefix", value_name = "PREFIX")]
    pub id_prefix: Option<String>,

    /// Write without indentation.
    #[arg(long = "compact")]
    pub compact: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// XML document or markup fragment.
    #[arg(value_name = "XML_FILE_OR_FRAGMENT")]
    pub path: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
