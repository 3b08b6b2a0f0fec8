use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use git_airgap::{
    app::context::AppContext,
    cli::Cli,
    commands::{dispatch, help::print_usage},
    logging::init::{init_tracing, print_fatal},
};
use tracing::{Level, error};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return parse_failure(&e),
    };

    let ctx = match AppContext::load(cli.config.as_deref(), cli.verbose) {
        Ok(ctx) => ctx,
        Err(err) => return fatal(&err),
    };

    if let Err(err) = init_tracing(cli.verbose, ctx.cfg.log_dir.as_deref()) {
        return fatal(&err);
    }

    match dispatch(&cli, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fatal(&err),
    }
}

/// Unknown verbs and flags fall through to help; every other parse error is
/// fatal with status 1.
fn parse_failure(e: &clap::Error) -> ExitCode {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            ExitCode::SUCCESS
        }
        ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument => match print_usage() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => fatal(&err),
        },
        _ => {
            let rendered = e.render().to_string();
            let first = rendered.lines().next().unwrap_or_default();
            print_fatal(first.strip_prefix("error: ").unwrap_or(first));
            ExitCode::FAILURE
        }
    }
}

/// Log the error chain once and fail. Falls back to a direct stdout line when
/// no subscriber would record it.
fn fatal(err: &anyhow::Error) -> ExitCode {
    if tracing::enabled!(Level::ERROR) {
        error!("{err:#}");
    } else {
        print_fatal(format_args!("{err:#}"));
    }
    ExitCode::FAILURE
}
