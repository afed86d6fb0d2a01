use anyhow::{Context, Result};
use clap::Args;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{display_path, OutputFormat};
use crate::application::services::environment_builder::{
    EnvironmentPolicy, DEFAULT_ALLOW_LIST, DEFAULT_HOME, DEFAULT_USER, TRUSTED_PATH,
};
use crate::application::use_cases::sync_working_copy::{
    SyncProgress, SyncWorkingCopyConfig, SyncWorkingCopyUseCase,
};
use crate::domain::entities::{
    step_result::StepResult,
    sync_outcome::{SyncOutcome, SyncReport},
    sync_step::SyncStep,
};
use crate::domain::value_objects::{
    branch_name::{BranchName, DEFAULT_BRANCH},
    remote_name::{RemoteName, DEFAULT_REMOTE},
    working_directory::WorkingDirectory,
};
use crate::infrastructure::scm::{GitScm, ScmError};
use crate::presentation::ui::{DisplayHelper, StatusType};

/// Arguments of `reposync sync`
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Remote to fetch and merge from
    #[arg(long, env = "REPOSYNC_REMOTE", default_value = DEFAULT_REMOTE, value_parser = parse_remote)]
    pub remote: RemoteName,

    /// Branch to fetch and merge
    #[arg(long, env = "REPOSYNC_BRANCH", default_value = DEFAULT_BRANCH, value_parser = parse_branch)]
    pub branch: BranchName,

    /// Allow the run to discard uncommitted changes and untracked files
    #[arg(long, env = "REPOSYNC_DISCARD_LOCAL_CHANGES")]
    pub discard_local_changes: bool,

    /// Per-step timeout in seconds
    #[arg(long, env = "REPOSYNC_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Git executable, looked up in the trusted search path
    #[arg(long, env = "REPOSYNC_GIT", default_value = "git", value_name = "EXE")]
    pub git: String,

    /// Additional environment variable passed through to git
    #[arg(long = "allow-env", env = "REPOSYNC_ALLOW_ENV", value_delimiter = ',', value_name = "NAME")]
    pub allow_env: Vec<String>,

    /// Search path git runs with
    #[arg(long, env = "REPOSYNC_TRUSTED_PATH", default_value = TRUSTED_PATH)]
    pub trusted_path: String,

    /// HOME used when the caller has none
    #[arg(long, env = "REPOSYNC_DEFAULT_HOME", default_value = DEFAULT_HOME)]
    pub default_home: String,

    /// USER used when the caller has none
    #[arg(long, env = "REPOSYNC_DEFAULT_USER", default_value = DEFAULT_USER)]
    pub default_user: String,

    /// Output format (text, json, yaml)
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

fn parse_remote(value: &str) -> Result<RemoteName, String> {
    value.parse::<RemoteName>().map_err(|e| e.to_string())
}

fn parse_branch(value: &str) -> Result<BranchName, String> {
    value.parse::<BranchName>().map_err(|e| e.to_string())
}

impl SyncArgs {
    fn environment_policy(&self) -> EnvironmentPolicy {
        let mut allow_list: Vec<String> =
            DEFAULT_ALLOW_LIST.iter().map(|name| name.to_string()).collect();
        for name in &self.allow_env {
            if !allow_list.contains(name) {
                allow_list.push(name.clone());
            }
        }

        EnvironmentPolicy::default()
            .with_trusted_path(&self.trusted_path)
            .with_default_home(&self.default_home)
            .with_default_user(&self.default_user)
            .with_allow_list(allow_list)
    }

    /// Assemble the use case configuration for a working copy at `directory`
    pub fn to_config(&self, directory: &Path) -> Result<SyncWorkingCopyConfig> {
        let working_directory = WorkingDirectory::new(directory)
            .with_context(|| format!("Invalid working directory: {}", directory.display()))?;

        let mut config = SyncWorkingCopyConfig::new(working_directory)
            .with_remote(self.remote.clone())
            .with_branch(self.branch.clone())
            .with_environment_policy(self.environment_policy())
            .with_discard_local_changes(self.discard_local_changes);
        if let Some(timeout) = self.timeout {
            config = config.with_step_timeout(timeout);
        }
        Ok(config)
    }
}

/// Echoes each step to the terminal as it runs
pub struct ConsoleReporter<'a> {
    display: &'a DisplayHelper,
    base_dir: &'a Path,
    verbose: bool,
    spinner: Option<ProgressBar>,
}

impl<'a> ConsoleReporter<'a> {
    pub fn new(display: &'a DisplayHelper, base_dir: &'a Path, verbose: bool) -> Self {
        Self {
            display,
            base_dir,
            verbose,
            spinner: None,
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn print_summary(&self, report: &SyncReport) {
        let total_ms: u64 = report
            .steps
            .iter()
            .chain(report.final_status.iter())
            .map(|result| result.duration_ms)
            .sum();

        self.display.print_summary(
            "Sync summary",
            &[
                (
                    "Working copy".to_string(),
                    display_path(&report.working_directory, self.base_dir),
                ),
                ("Remote".to_string(), report.remote.clone()),
                (
                    "Branch".to_string(),
                    self.display.format_branch(&report.branch),
                ),
                ("Outcome".to_string(), report.outcome.to_string()),
                (
                    "Duration".to_string(),
                    self.display
                        .format_duration(Duration::from_millis(total_ms)),
                ),
            ],
        );
    }
}

impl SyncProgress for ConsoleReporter<'_> {
    fn step_started(&mut self, step: SyncStep) {
        self.clear_spinner();
        self.display.info(step.description());
        self.spinner = Some(self.display.create_spinner(&format!("{step}...")));
    }

    fn step_finished(&mut self, result: &StepResult) {
        self.clear_spinner();
        self.display.debug(
            &format!(
                "{} ({} ms)",
                self.display.format_command(&result.command_line()),
                result.duration_ms
            ),
            self.verbose,
        );

        // Best effort: a closed pipe must not change the sync outcome.
        let _ = self.display.print_stdout_block(&result.stdout);
        let _ = self.display.print_stderr_block(&result.stderr);

        if !result.success() {
            self.display.warning(&format!(
                "{} exited with code {}",
                self.display.format_command(&result.command_line()),
                result.exit_code
            ));
        }
    }

    fn step_failed(&mut self, step: SyncStep, error: &ScmError) {
        self.clear_spinner();
        self.display
            .error(&format!("{step} could not be run: {error}"));
    }

    fn outcome(&mut self, report: &SyncReport) {
        self.clear_spinner();
        match report.outcome {
            SyncOutcome::Success => self
                .display
                .print_status(StatusType::Success, "Working copy is up to date"),
            SyncOutcome::ConflictDetected => self.display.print_status(
                StatusType::Warning,
                "Merge conflict detected; resolve the conflicting files manually",
            ),
            SyncOutcome::ToolInvocationError => {
                let reason = report
                    .failure
                    .as_ref()
                    .map(|failure| failure.to_string())
                    .unwrap_or_else(|| "unknown failure".to_string());
                self.display
                    .print_status(StatusType::Error, &format!("Sync aborted: {reason}"));
            }
        }
        self.print_summary(report);
    }
}

/// Forwards git's stderr while stdout is reserved for a structured report
pub struct DiagnosticsReporter<'a> {
    display: &'a DisplayHelper,
}

impl<'a> DiagnosticsReporter<'a> {
    pub fn new(display: &'a DisplayHelper) -> Self {
        Self { display }
    }
}

impl SyncProgress for DiagnosticsReporter<'_> {
    fn step_finished(&mut self, result: &StepResult) {
        let _ = self.display.print_stderr_block(&result.stderr);
    }

    fn step_failed(&mut self, step: SyncStep, error: &ScmError) {
        self.display
            .error(&format!("{step} could not be run: {error}"));
    }
}

/// Handler for the sync command
pub struct SyncCommand {
    pub args: SyncArgs,
    /// Absolute path of the working copy
    pub directory: PathBuf,
    pub verbose: bool,
}

impl SyncCommand {
    pub fn new(args: SyncArgs, directory: PathBuf, verbose: bool) -> Self {
        Self {
            args,
            directory,
            verbose,
        }
    }

    /// Run the sync and return the process exit code for its outcome
    pub async fn execute(&self, display: &DisplayHelper) -> Result<i32> {
        let config = self.args.to_config(&self.directory)?;
        let use_case =
            SyncWorkingCopyUseCase::new(config, GitScm::with_executable(&self.args.git));

        let report = match self.args.output {
            OutputFormat::Text => {
                display.info(&format!(
                    "Synchronizing {} with {}/{}",
                    display.format_path(&self.directory.display().to_string()),
                    self.args.remote,
                    self.args.branch
                ));
                let cwd = std::env::current_dir().unwrap_or_else(|_| self.directory.clone());
                let mut reporter = ConsoleReporter::new(display, &cwd, self.verbose);
                use_case.execute(ambient_environment(), &mut reporter).await?
            }
            OutputFormat::Json | OutputFormat::Yaml => {
                let mut reporter = DiagnosticsReporter::new(display);
                let report = use_case
                    .execute(ambient_environment(), &mut reporter)
                    .await?;
                self.args.output.print(&report)?;
                report
            }
        };

        Ok(report.exit_code())
    }
}

/// The caller's environment, skipping entries that are not valid UTF-8
fn ambient_environment() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SyncArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["sync"]).unwrap();
        assert_eq!(cli.args.remote.as_str(), "origin");
        assert_eq!(cli.args.branch.as_str(), "main");
        assert!(!cli.args.discard_local_changes);
        assert_eq!(cli.args.trusted_path, TRUSTED_PATH);
    }

    #[test]
    fn test_option_like_names_are_rejected() {
        assert!(TestCli::try_parse_from(["sync", "--remote=--upload-pack=x"]).is_err());
        assert!(TestCli::try_parse_from(["sync", "--branch", "-f"]).is_err());
    }

    #[test]
    fn test_allow_env_extends_default_list() {
        let cli = TestCli::try_parse_from([
            "sync",
            "--allow-env",
            "EDITOR",
            "--allow-env",
            "GIT_PAGER",
        ])
        .unwrap();
        let policy = cli.args.environment_policy();

        assert_eq!(policy.allow_list.len(), DEFAULT_ALLOW_LIST.len() + 1);
        assert_eq!(policy.allow_list.last().map(String::as_str), Some("EDITOR"));
    }

    #[test]
    fn test_to_config_carries_acknowledgement_and_timeout() {
        let cli = TestCli::try_parse_from([
            "sync",
            "--discard-local-changes",
            "--timeout",
            "45",
            "--branch",
            "develop",
        ])
        .unwrap();
        let config = cli.args.to_config(Path::new("/srv/app")).unwrap();

        assert!(config.discard_local_changes);
        assert_eq!(config.step_timeout_seconds, Some(45));
        assert_eq!(config.branch.as_str(), "develop");
        assert!(config.validate().is_ok());
    }
}
