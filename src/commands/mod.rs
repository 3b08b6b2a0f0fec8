use anyhow::Result;
use tracing::warn;

use crate::{
    app::context::AppContext,
    cli::{Cli, Commands},
    core::version::Version,
    error::AirgapError,
};

pub mod baseline;
pub mod help;
pub mod list;
pub mod rollback;
pub mod setup;
pub mod update;
pub mod verify;

/// Unified interface implemented by each subcommand handler.
pub trait Command {
    /// Execute the subcommand.
    ///
    /// # Errors
    /// Returns an error if the command fails.
    fn run(&self, ctx: &AppContext) -> Result<()>;
}

/// Central dispatcher: routes parsed CLI to subcommand handlers.
/// A missing verb falls through to `help`; surplus positionals are ignored.
///
/// # Errors
/// Returns an error if the invoked subcommand fails.
pub fn dispatch(cli: &Cli, ctx: &AppContext) -> Result<()> {
    if let Some(command) = &cli.command
        && !command.extra().is_empty()
    {
        warn!(verb = command.name(), ignored = ?command.extra(), "ignoring extra arguments");
    }

    match &cli.command {
        Some(Commands::Setup { .. }) => setup::SetupCommand.run(ctx),
        Some(Commands::Baseline { version, .. }) => {
            let cmd = baseline::BaselineCommand {
                version: version.as_deref(),
            };
            cmd.run(ctx)
        }
        Some(Commands::Update { base_version, .. }) => {
            let cmd = update::UpdateCommand {
                base_version: base_version.as_deref(),
            };
            cmd.run(ctx)
        }
        Some(Commands::Rollback { commits, .. }) => {
            let cmd = rollback::RollbackCommand {
                commits: commits.as_deref(),
            };
            cmd.run(ctx)
        }
        Some(Commands::List { .. }) => list::ListCommand.run(ctx),
        Some(Commands::Verify { artifact, .. }) => {
            let cmd = verify::VerifyCommand {
                artifact: artifact.as_deref(),
            };
            cmd.run(ctx)
        }
        Some(Commands::Help { .. }) | None => help::HelpCommand.run(ctx),
    }
}

/// Validate a required version argument before anything touches the
/// repository.
fn required_version(raw: Option<&str>, name: &'static str) -> Result<Version> {
    let raw = raw.ok_or(AirgapError::MissingArgument(name))?;
    Ok(raw.parse()?)
}
