use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::entities::step_result::StepResult;
use crate::domain::value_objects::{
    branch_name::BranchName, process_environment::ProcessEnvironment, remote_name::RemoteName,
    working_directory::WorkingDirectory,
};
use crate::infrastructure::process::CommandExecutorError;

/// Everything a sub-operation needs besides its own arguments.
///
/// One context is built per run and lent to every call, so all steps see
/// the same working copy, environment and timeout.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub working_directory: WorkingDirectory,
    pub environment: ProcessEnvironment,
    pub remote: RemoteName,
    pub branch: BranchName,
    /// Applied to each sub-operation separately
    pub timeout_seconds: Option<u64>,
}

/// Version-control operations the sync pipeline is built from.
///
/// Implementations report a non-zero exit status through
/// [`StepResult::exit_code`]; `Err` is reserved for failing to run the tool
/// at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScmOperations: Send + Sync {
    /// Locate the non-bare repository containing `path` and return the root
    /// of its working tree
    fn verify_repository(&self, path: &Path) -> Result<PathBuf, ScmError>;

    /// Show the working tree status
    async fn status(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError>;

    /// Discard uncommitted changes to tracked files
    async fn reset_hard(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError>;

    /// Remove untracked files and directories
    async fn clean(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError>;

    /// Fetch `ctx.branch` from `ctx.remote`
    async fn fetch(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError>;

    /// Merge `ctx.branch` from `ctx.remote` into the current branch
    async fn pull(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError>;

    /// Status snapshot taken after the merge
    async fn final_status(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError>;
}

/// Errors that prevent a sub-operation from running
#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("SCM executable not found: {executable}")]
    ExecutableNotFound { executable: String },

    #[error("Working directory not found: {}", path.display())]
    WorkingDirectoryNotFound { path: PathBuf },

    #[error("Not a git working copy: {} ({message})", path.display())]
    NotARepository { path: PathBuf, message: String },

    #[error("Command `{command}` timed out after {timeout_seconds} seconds")]
    Timeout {
        command: String,
        timeout_seconds: u64,
    },

    #[error("Command execution failed: {message}")]
    InvocationFailed { message: String },
}

impl ScmError {
    pub fn executable_not_found(executable: impl Into<String>) -> Self {
        Self::ExecutableNotFound {
            executable: executable.into(),
        }
    }

    pub fn not_a_repository(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::NotARepository {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invocation_failed(message: impl Into<String>) -> Self {
        Self::InvocationFailed {
            message: message.into(),
        }
    }
}

impl From<CommandExecutorError> for ScmError {
    fn from(error: CommandExecutorError) -> Self {
        match error {
            CommandExecutorError::ExecutableNotFound { program } => {
                Self::executable_not_found(program)
            }
            CommandExecutorError::WorkingDirectoryNotFound { path } => {
                Self::WorkingDirectoryNotFound { path }
            }
            CommandExecutorError::Timeout {
                command,
                timeout_seconds,
            } => Self::Timeout {
                command,
                timeout_seconds,
            },
            other => Self::invocation_failed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_errors_map_to_scm_errors() {
        let error: ScmError = CommandExecutorError::ExecutableNotFound {
            program: "git".to_string(),
        }
        .into();
        assert!(matches!(error, ScmError::ExecutableNotFound { ref executable } if executable == "git"));

        let error: ScmError = CommandExecutorError::Timeout {
            command: "git fetch origin main".to_string(),
            timeout_seconds: 5,
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Command `git fetch origin main` timed out after 5 seconds"
        );

        let error: ScmError = CommandExecutorError::InvalidCommand("empty".to_string()).into();
        assert!(matches!(error, ScmError::InvocationFailed { .. }));
    }
}
