use std::path::PathBuf;
use tracing::{error, info, warn};
use validator::Validate;

use crate::application::services::environment_builder::{EnvironmentBuilder, EnvironmentPolicy};
use crate::common::error::RepoSyncError;
use crate::common::result::RepoSyncResult;
use crate::domain::entities::{
    step_result::StepResult,
    sync_outcome::{SyncFailure, SyncOutcome, SyncReport, SyncState},
    sync_step::{FailurePolicy, SyncStep},
};
use crate::domain::value_objects::{
    branch_name::BranchName, remote_name::RemoteName, working_directory::WorkingDirectory,
};
use crate::infrastructure::scm::{InvocationContext, ScmError, ScmOperations};

/// Observer for pipeline progress.
///
/// Every step's result is delivered before the pipeline acts on it, so an
/// observer sees output in execution order even when the run aborts.
pub trait SyncProgress {
    fn step_started(&mut self, _step: SyncStep) {}

    fn step_finished(&mut self, _result: &StepResult) {}

    /// The step could not be run at all
    fn step_failed(&mut self, _step: SyncStep, _error: &ScmError) {}

    fn outcome(&mut self, _report: &SyncReport) {}
}

/// Progress observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProgress;

impl SyncProgress for NoOpProgress {}

/// Settings for one sync run
#[derive(Debug, Clone)]
pub struct SyncWorkingCopyConfig {
    pub working_directory: WorkingDirectory,

    pub remote: RemoteName,

    pub branch: BranchName,

    pub environment_policy: EnvironmentPolicy,

    /// Per-step timeout; `None` waits indefinitely
    pub step_timeout_seconds: Option<u64>,

    /// The reset step throws away local work, so the caller has to opt in
    pub discard_local_changes: bool,
}

impl SyncWorkingCopyConfig {
    pub fn new(working_directory: WorkingDirectory) -> Self {
        Self {
            working_directory,
            remote: RemoteName::default(),
            branch: BranchName::default(),
            environment_policy: EnvironmentPolicy::default(),
            step_timeout_seconds: None,
            discard_local_changes: false,
        }
    }

    pub fn with_remote(mut self, remote: RemoteName) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_branch(mut self, branch: BranchName) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_environment_policy(mut self, policy: EnvironmentPolicy) -> Self {
        self.environment_policy = policy;
        self
    }

    pub fn with_step_timeout(mut self, timeout_seconds: u64) -> Self {
        self.step_timeout_seconds = Some(timeout_seconds);
        self
    }

    pub fn with_discard_local_changes(mut self, discard: bool) -> Self {
        self.discard_local_changes = discard;
        self
    }

    /// Check everything that can be checked before touching the working copy
    pub fn validate(&self) -> RepoSyncResult<()> {
        if !self.discard_local_changes {
            return Err(RepoSyncError::validation_error(
                "discard_local_changes",
                "syncing runs `git reset --hard HEAD` and `git clean -fd`, which permanently \
                 discard local changes; acknowledge this explicitly to proceed",
                None,
            ));
        }

        self.environment_policy.validate()?;

        let relative = self.environment_policy.relative_path_entries();
        if !relative.is_empty() {
            return Err(RepoSyncError::validation_error(
                "trusted_path",
                "every search path entry must be an absolute directory",
                Some(relative.join(":")),
            ));
        }

        if self.step_timeout_seconds == Some(0) {
            return Err(RepoSyncError::validation_error(
                "step_timeout_seconds",
                "timeout must be at least one second",
                Some("0".to_string()),
            ));
        }

        Ok(())
    }
}

/// Accumulates what a run has observed so far
struct PipelineRun<'a> {
    config: &'a SyncWorkingCopyConfig,
    /// Root of the working tree once the preflight has located it
    working_directory: PathBuf,
    state: SyncState,
    steps: Vec<StepResult>,
}

impl<'a> PipelineRun<'a> {
    fn new(config: &'a SyncWorkingCopyConfig) -> Self {
        Self {
            config,
            working_directory: config.working_directory.as_path().to_path_buf(),
            state: SyncState::Idle,
            steps: Vec::new(),
        }
    }

    fn record(&mut self, result: StepResult) {
        match self.state.advance(result.step, result.exit_code) {
            Some(next) => {
                info!(from = ?self.state, to = ?next, "sync state transition");
                self.state = next;
            }
            None => warn!(state = ?self.state, step = %result.step, "unexpected step order"),
        }
        self.steps.push(result);
    }

    fn finish(
        self,
        outcome: SyncOutcome,
        final_status: Option<StepResult>,
        failure: Option<SyncFailure>,
    ) -> SyncReport {
        let state = if outcome == SyncOutcome::ToolInvocationError {
            SyncState::Aborted
        } else {
            self.state
        };

        SyncReport {
            working_directory: self.working_directory,
            remote: self.config.remote.to_string(),
            branch: self.config.branch.to_string(),
            outcome,
            state,
            steps: self.steps,
            final_status,
            failure,
        }
    }

    fn abort(self, failure: SyncFailure) -> SyncReport {
        error!(%failure, "sync aborted");
        self.finish(SyncOutcome::ToolInvocationError, None, Some(failure))
    }
}

/// Status, reset, clean, fetch and merge a working copy, then report
pub struct SyncWorkingCopyUseCase<S> {
    config: SyncWorkingCopyConfig,
    scm: S,
}

impl<S: ScmOperations> SyncWorkingCopyUseCase<S> {
    pub fn new(config: SyncWorkingCopyConfig, scm: S) -> Self {
        Self { config, scm }
    }

    pub fn config(&self) -> &SyncWorkingCopyConfig {
        &self.config
    }

    /// Run the pipeline once.
    ///
    /// `ambient` is the caller's environment; it is read once to build the
    /// sanitized environment and not consulted again. `Err` means nothing
    /// was executed because the configuration was rejected. Every run that
    /// starts produces a report, including aborted ones.
    pub async fn execute<I>(
        &self,
        ambient: I,
        progress: &mut dyn SyncProgress,
    ) -> RepoSyncResult<SyncReport>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.config.validate()?;

        let environment =
            EnvironmentBuilder::new(self.config.environment_policy.clone()).build(ambient);

        info!(
            working_directory = %self.config.working_directory,
            remote = %self.config.remote,
            branch = %self.config.branch,
            "starting sync"
        );

        let mut run = PipelineRun::new(&self.config);

        let working_directory = match self.locate_working_tree() {
            Ok(root) => root,
            Err(e) => {
                let report = run.abort(SyncFailure::Invocation {
                    step: None,
                    message: e.to_string(),
                });
                progress.outcome(&report);
                return Ok(report);
            }
        };
        if working_directory != self.config.working_directory {
            info!(root = %working_directory, "syncing the enclosing working tree");
        }
        run.working_directory = working_directory.as_path().to_path_buf();

        let ctx = InvocationContext {
            working_directory,
            environment,
            remote: self.config.remote.clone(),
            branch: self.config.branch.clone(),
            timeout_seconds: self.config.step_timeout_seconds,
        };

        for step in SyncStep::PIPELINE {
            progress.step_started(step);
            let result = match self.invoke(step, &ctx).await {
                Ok(result) => result,
                Err(e) => {
                    progress.step_failed(step, &e);
                    let report = run.abort(SyncFailure::Invocation {
                        step: Some(step),
                        message: e.to_string(),
                    });
                    progress.outcome(&report);
                    return Ok(report);
                }
            };
            progress.step_finished(&result);

            let exit_code = result.exit_code;
            let stderr = result.stderr.clone();
            run.record(result);

            if exit_code == 0 {
                continue;
            }
            match step.failure_policy() {
                FailurePolicy::Informational => {
                    warn!(%step, exit_code, "step exited non-zero; continuing");
                }
                FailurePolicy::Fatal => {
                    let report = run.abort(SyncFailure::StepFailed {
                        step,
                        exit_code,
                        stderr,
                    });
                    progress.outcome(&report);
                    return Ok(report);
                }
                FailurePolicy::Decisive => {
                    warn!(exit_code, "merge did not complete; conflicts need manual resolution");
                }
            }
        }

        if !run.state.is_terminal() {
            let message = format!("pipeline stopped in state {:?} before the merge", run.state);
            let report = run.abort(SyncFailure::Invocation {
                step: None,
                message,
            });
            progress.outcome(&report);
            return Ok(report);
        }
        let outcome = if run.state == SyncState::Succeeded {
            SyncOutcome::Success
        } else {
            SyncOutcome::ConflictDetected
        };

        // The snapshot is taken for both outcomes and never changes the outcome.
        progress.step_started(SyncStep::FinalStatus);
        let final_status = match self.invoke(SyncStep::FinalStatus, &ctx).await {
            Ok(result) => {
                progress.step_finished(&result);
                Some(result)
            }
            Err(e) => {
                warn!(error = %e, "final status snapshot failed");
                progress.step_failed(SyncStep::FinalStatus, &e);
                None
            }
        };

        let report = run.finish(outcome, final_status, None);
        info!(outcome = %report.outcome, "sync finished");
        progress.outcome(&report);
        Ok(report)
    }

    fn locate_working_tree(&self) -> Result<WorkingDirectory, ScmError> {
        let root = self
            .scm
            .verify_repository(self.config.working_directory.as_path())?;
        WorkingDirectory::new(&root).map_err(|e| ScmError::not_a_repository(&root, e.to_string()))
    }

    async fn invoke(
        &self,
        step: SyncStep,
        ctx: &InvocationContext,
    ) -> Result<StepResult, ScmError> {
        info!(%step, "{}", step.description());
        match step {
            SyncStep::Status => self.scm.status(ctx).await,
            SyncStep::Reset => self.scm.reset_hard(ctx).await,
            SyncStep::Clean => self.scm.clean(ctx).await,
            SyncStep::Fetch => self.scm.fetch(ctx).await,
            SyncStep::Merge => self.scm.pull(ctx).await,
            SyncStep::FinalStatus => self.scm.final_status(ctx).await,
        }
    }
}
