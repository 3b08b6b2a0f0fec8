use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// git-airgap command-line interface
#[derive(Parser, Debug, Clone)]
#[command(
    name = "git-airgap",
    version,
    about = "Package git history as verified bundles for air-gapped environments",
    long_about = None,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv). `RUST_LOG` overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./.git-airgap.conf)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

// Positionals accept hyphen-leading values so that `-1.0.0` reaches version
// validation. Anything after the expected positionals lands in `extra`.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create bundle/log directories, validate the repository, write config if absent
    Setup {
        #[arg(hide = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },

    /// Tag the current state as baseline-<VERSION> and export a full bundle
    Baseline {
        /// Version in MAJOR.MINOR.PATCH form
        #[arg(value_name = "VERSION", allow_hyphen_values = true)]
        version: Option<String>,

        #[arg(hide = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },

    /// Export commits made since baseline-<BASE_VERSION> as an incremental bundle
    Update {
        /// Version of an existing baseline
        #[arg(value_name = "BASE_VERSION", allow_hyphen_values = true)]
        base_version: Option<String>,

        #[arg(hide = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },

    /// Revert the most recent commits, keeping the old tip on a backup branch
    Rollback {
        /// Number of commits to revert (default: 1)
        #[arg(value_name = "COMMITS", allow_hyphen_values = true)]
        commits: Option<String>,

        #[arg(hide = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },

    /// Show baseline tags and exported artifacts
    List {
        #[arg(hide = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },

    /// Check an artifact with git's bundle verification
    Verify {
        /// Artifact path, or a file name inside the bundle directory
        #[arg(value_name = "ARTIFACT", allow_hyphen_values = true)]
        artifact: Option<PathBuf>,

        #[arg(hide = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },

    /// Print usage
    Help {
        #[arg(hide = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },
}

impl Commands {
    /// Verb name as typed on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Setup { .. } => "setup",
            Self::Baseline { .. } => "baseline",
            Self::Update { .. } => "update",
            Self::Rollback { .. } => "rollback",
            Self::List { .. } => "list",
            Self::Verify { .. } => "verify",
            Self::Help { .. } => "help",
        }
    }

    /// Positional arguments beyond the ones the verb uses.
    #[must_use]
    pub fn extra(&self) -> &[String] {
        match self {
            Self::Setup { extra }
            | Self::Baseline { extra, .. }
            | Self::Update { extra, .. }
            | Self::Rollback { extra, .. }
            | Self::List { extra }
            | Self::Verify { extra, .. }
            | Self::Help { extra } => extra,
        }
    }
}
