use std::io::Write as _;

use anyhow::{Context, Result};
use clap::CommandFactory;

use super::Command;
use crate::{app::context::AppContext, cli::Cli};

pub struct HelpCommand;

impl Command for HelpCommand {
    fn run(&self, _ctx: &AppContext) -> Result<()> {
        print_usage()
    }
}

/// Print usage text to stdout.
///
/// # Errors
/// Returns an error if stdout cannot be written.
pub fn print_usage() -> Result<()> {
    Cli::command()
        .print_help()
        .and_then(|()| writeln!(std::io::stdout()))
        .context("failed to print usage")
}
