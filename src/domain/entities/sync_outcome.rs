use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::step_result::StepResult;
use super::sync_step::SyncStep;

/// Terminal result of one sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Merge exited zero
    Success,
    /// Merge exited non-zero; the working copy needs manual attention
    ConflictDetected,
    /// The pipeline could not run to the merge step
    ToolInvocationError,
}

impl SyncOutcome {
    /// Process exit code the CLI reports for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            SyncOutcome::Success => 0,
            SyncOutcome::ConflictDetected => 1,
            SyncOutcome::ToolInvocationError => 2,
        }
    }

    pub fn is_success(self) -> bool {
        self == SyncOutcome::Success
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SyncOutcome::Success => "success",
            SyncOutcome::ConflictDetected => "conflict detected",
            SyncOutcome::ToolInvocationError => "tool invocation error",
        };
        f.write_str(text)
    }
}

/// Pipeline progress.
///
/// `Idle → StatusChecked → Reset → Cleaned → Fetched → {Succeeded | ConflictDetected}`;
/// any fatal stop moves to `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    StatusChecked,
    Reset,
    Cleaned,
    Fetched,
    Succeeded,
    ConflictDetected,
    Aborted,
}

impl SyncState {
    /// State reached once `step` has completed with `exit_code`.
    ///
    /// Returns `None` when the step is not the one expected next.
    pub fn advance(self, step: SyncStep, exit_code: i32) -> Option<SyncState> {
        match (self, step) {
            (SyncState::Idle, SyncStep::Status) => Some(SyncState::StatusChecked),
            (SyncState::StatusChecked, SyncStep::Reset) => Some(SyncState::Reset),
            (SyncState::Reset, SyncStep::Clean) => Some(SyncState::Cleaned),
            (SyncState::Cleaned, SyncStep::Fetch) => Some(SyncState::Fetched),
            (SyncState::Fetched, SyncStep::Merge) if exit_code == 0 => Some(SyncState::Succeeded),
            (SyncState::Fetched, SyncStep::Merge) => Some(SyncState::ConflictDetected),
            _ => None,
        }
    }

    /// No pipeline step can follow this state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SyncState::Succeeded | SyncState::ConflictDetected | SyncState::Aborted
        )
    }
}

/// Why a run ended in [`SyncOutcome::ToolInvocationError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncFailure {
    /// A fatal step ran and exited non-zero
    StepFailed {
        step: SyncStep,
        exit_code: i32,
        stderr: String,
    },
    /// Git could not be run at all, or the working copy is unusable
    Invocation {
        step: Option<SyncStep>,
        message: String,
    },
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncFailure::StepFailed {
                step,
                exit_code,
                stderr,
            } => write!(f, "{step} failed with exit code {exit_code}: {}", stderr.trim()),
            SyncFailure::Invocation {
                step: Some(step),
                message,
            } => write!(f, "{step} could not be run: {message}"),
            SyncFailure::Invocation {
                step: None,
                message,
            } => f.write_str(message),
        }
    }
}

/// Everything observed during one run, in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub working_directory: PathBuf,
    pub remote: String,
    pub branch: String,
    pub outcome: SyncOutcome,
    pub state: SyncState,
    /// Pipeline steps that were executed
    pub steps: Vec<StepResult>,
    /// Status snapshot taken after the merge step
    pub final_status: Option<StepResult>,
    pub failure: Option<SyncFailure>,
}

impl SyncReport {
    pub fn step(&self, step: SyncStep) -> Option<&StepResult> {
        if step == SyncStep::FinalStatus {
            return self.final_status.as_ref();
        }
        self.steps.iter().find(|result| result.step == step)
    }

    pub fn ran(&self, step: SyncStep) -> bool {
        self.step(step).is_some()
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}
