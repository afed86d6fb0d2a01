pub mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing::debug;

use crate::presentation::ui::DisplayHelper;
use commands::{ScanArgs, ScanCommand, SyncArgs, SyncCommand};

pub use commands::OutputFormat;

/// Exit code for usage and configuration errors, and runs that could not execute git
pub const EXIT_FAILURE: i32 = 2;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    " for ",
    env!("BUILD_TARGET"),
    ")"
);

/// reposync - Reset, clean, fetch and merge a git working copy
#[derive(Parser)]
#[command(name = "reposync")]
#[command(about = "Reset, clean, fetch and merge a git working copy in a sanitized environment")]
#[command(version, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long, global = true, env = "REPOSYNC_DIRECTORY")]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discard local changes, then fetch and merge a remote branch
    ///
    /// Runs `git status`, `git reset --hard HEAD`, `git clean -fd`,
    /// `git fetch <remote> <branch>` and `git pull <remote> <branch>`, then a
    /// final `git status`. Exits 0 on success, 1 on a merge conflict and 2 when
    /// git could not be run or a required step failed.
    Sync(SyncArgs),

    /// Check that files are referenced by an Xcode project manifest
    Scan(ScanArgs),
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub fn verbose(&self) -> bool {
        self.cli.verbose
    }

    /// Whether the log subscriber may style its output
    pub fn log_ansi(&self) -> bool {
        DisplayHelper::stderr_color(self.cli.no_color)
    }

    /// Run the selected command and return the process exit code
    pub async fn run(self) -> i32 {
        let display = DisplayHelper::detect(self.cli.no_color);
        colored::control::set_override(display.use_color);

        match self.handle_command(&display).await {
            Ok(code) => code,
            Err(e) => {
                display.error(&format!("{e:#}"));
                EXIT_FAILURE
            }
        }
    }

    async fn handle_command(&self, display: &DisplayHelper) -> anyhow::Result<i32> {
        let directory = self.resolve_directory()?;
        debug!(directory = %directory.display(), "resolved working directory");

        match &self.cli.command {
            Commands::Sync(args) => {
                SyncCommand::new(args.clone(), directory, self.cli.verbose)
                    .execute(display)
                    .await
            }
            Commands::Scan(args) => {
                ScanCommand::new(args.clone(), directory)
                    .execute(display)
                    .await
            }
        }
    }

    /// `-C` resolved against the current directory; never changes the
    /// process's own current directory
    fn resolve_directory(&self) -> anyhow::Result<PathBuf> {
        let current = env::current_dir().context("Cannot determine the current directory")?;
        Ok(match &self.cli.directory {
            Some(dir) => current.join(dir),
            None => current,
        })
    }
}
