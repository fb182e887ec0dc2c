//! EAD finding-aid export CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use ead_cli::commands::{ExportRequest, run_check, run_export};
use ead_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, ExportArgs, LogFormatArg, LogLevelArg};
use crate::summary::{print_diagnostics, print_export_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Export(args) => match run_export(&export_request(args)) {
            Ok(summary) => {
                print_export_summary(&summary);
                i32::from(summary.has_failures())
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Check(args) => match run_check(&args.path) {
            Ok(diagnostics) => {
                print_diagnostics(&diagnostics);
                i32::from(diagnostics.iter().any(|d| !d.is_suppressed()))
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn export_request(args: ExportArgs) -> ExportRequest {
    ExportRequest {
        record: args.record,
        config: args.config,
        output: args.output,
        include_unpublished: args.include_unpublished,
        include_daos: args.include_daos,
        numbered_c_tags: args.numbered_c_tags,
        id_prefix: args.id_prefix,
        compact: args.compact,
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
