use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_objects::{branch_name::BranchName, remote_name::RemoteName};

/// How the pipeline reacts to a non-zero exit code from a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Exit code is reported and otherwise ignored
    Informational,
    /// A non-zero exit aborts the run
    Fatal,
    /// The exit code decides the outcome of the run
    Decisive,
}

/// One git sub-operation of the sync pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    Status,
    Reset,
    Clean,
    Fetch,
    Merge,
    FinalStatus,
}

impl SyncStep {
    /// The pipeline steps in execution order, excluding the final snapshot
    pub const PIPELINE: [SyncStep; 5] = [
        SyncStep::Status,
        SyncStep::Reset,
        SyncStep::Clean,
        SyncStep::Fetch,
        SyncStep::Merge,
    ];

    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            SyncStep::Status | SyncStep::Clean | SyncStep::FinalStatus => {
                FailurePolicy::Informational
            }
            SyncStep::Reset | SyncStep::Fetch => FailurePolicy::Fatal,
            SyncStep::Merge => FailurePolicy::Decisive,
        }
    }

    /// Git argument vector for this step.
    ///
    /// Every value is its own element; nothing is ever joined into a string
    /// for a shell to split.
    pub fn arguments(self, remote: &RemoteName, branch: &BranchName) -> Vec<String> {
        match self {
            SyncStep::Status | SyncStep::FinalStatus => vec!["status".to_string()],
            SyncStep::Reset => vec!["reset".into(), "--hard".into(), "HEAD".into()],
            SyncStep::Clean => vec!["clean".into(), "-fd".into()],
            SyncStep::Fetch => vec![
                "fetch".into(),
                remote.as_str().to_string(),
                branch.as_str().to_string(),
            ],
            SyncStep::Merge => vec![
                "pull".into(),
                remote.as_str().to_string(),
                branch.as_str().to_string(),
            ],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SyncStep::Status => "Checking git status",
            SyncStep::Reset => "Discarding uncommitted changes",
            SyncStep::Clean => "Removing untracked files",
            SyncStep::Fetch => "Fetching from remote",
            SyncStep::Merge => "Attempting merge",
            SyncStep::FinalStatus => "Final status",
        }
    }
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStep::Status => "status",
            SyncStep::Reset => "reset",
            SyncStep::Clean => "clean",
            SyncStep::Fetch => "fetch",
            SyncStep::Merge => "merge",
            SyncStep::FinalStatus => "final-status",
        };
        f.write_str(name)
    }
}
