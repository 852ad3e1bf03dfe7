//! `polars-mas`: PheWAS / FlipWAS association runs from the command line.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use mas_cli::cli::{Cli, LogFormatArg, LogLevelArg, RunArgs};
use mas_cli::commands::{EXIT_FAILURE, EXIT_SUCCESS, exit_code, plan_run, run_study};
use mas_cli::logging::{LogConfig, LogFormat, init_logging};
use mas_cli::signal::spawn_interrupt_watcher;
use mas_cli::summary::{print_config_summary, print_run_summary};
use mas_core::CancellationFlag;
use mas_model::AnalysisKind;
use tracing::level_filters::LevelFilter;
use tracing::warn;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FAILURE);
    }
    let exit_code = execute(cli.command.analysis(), cli.command.args());
    std::process::exit(exit_code);
}

fn execute(analysis: AnalysisKind, args: &RunArgs) -> i32 {
    let plan = match plan_run(analysis, args) {
        Ok(plan) => plan,
        Err(error) => {
            eprintln!("error: {error:#}");
            return EXIT_FAILURE;
        }
    };
    print_config_summary(&plan);
    if args.dry_run {
        return EXIT_SUCCESS;
    }

    let cancel = CancellationFlag::new();
    if let Err(error) = spawn_interrupt_watcher(cancel.clone()) {
        warn!(%error, "could not install interrupt handler");
    }
    match run_study(plan, &cancel) {
        Ok(report) => {
            print_run_summary(&report);
            EXIT_SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            exit_code(&error)
        }
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
