use async_trait::async_trait;
use chrono::Utc;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::scm_interface::{InvocationContext, ScmError, ScmOperations};
use crate::domain::entities::{step_result::StepResult, sync_step::SyncStep};
use crate::infrastructure::process::{CommandExecutor, ExecutionConfig};

/// Git implementation of SCM operations, driving the `git` executable
pub struct GitScm {
    git_executable: String,
}

impl Default for GitScm {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
        }
    }
}

impl GitScm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific executable. A bare name is looked up in the sanitized
    /// environment's PATH, not the caller's.
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            git_executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.git_executable
    }

    async fn run_step(
        &self,
        step: SyncStep,
        ctx: &InvocationContext,
    ) -> Result<StepResult, ScmError> {
        let args = step.arguments(&ctx.remote, &ctx.branch);

        let mut config = ExecutionConfig::new()
            .with_working_directory(ctx.working_directory.as_path())
            .with_environment(ctx.environment.clone());
        if let Some(timeout_secs) = ctx.timeout_seconds {
            config = config.with_timeout(timeout_secs);
        }

        let started_at = Utc::now();
        let result = CommandExecutor::execute(&self.git_executable, &args, &config).await?;

        debug!(%step, exit_code = result.exit_code, "git step finished");

        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(self.git_executable.clone());
        command.extend(args);

        Ok(StepResult {
            step,
            command,
            stdout: result.stdout,
            stderr: result.stderr,
            exit_code: result.exit_code,
            started_at,
            duration_ms: result.execution_time_ms,
        })
    }
}

#[async_trait]
impl ScmOperations for GitScm {
    fn verify_repository(&self, path: &Path) -> Result<PathBuf, ScmError> {
        if !path.is_dir() {
            return Err(ScmError::WorkingDirectoryNotFound {
                path: path.to_path_buf(),
            });
        }

        // Empty flags search parent directories, like git itself does.
        let repo = git2::Repository::open_ext(
            path,
            git2::RepositoryOpenFlags::empty(),
            std::iter::empty::<&OsStr>(),
        )
        .map_err(|e| ScmError::not_a_repository(path, e.message().to_string()))?;

        match repo.workdir() {
            Some(workdir) => {
                debug!(path = %path.display(), workdir = %workdir.display(), "repository located");
                Ok(workdir.to_path_buf())
            }
            None => Err(ScmError::not_a_repository(
                path,
                "bare repository has no working tree",
            )),
        }
    }

    async fn status(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError> {
        self.run_step(SyncStep::Status, ctx).await
    }

    async fn reset_hard(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError> {
        self.run_step(SyncStep::Reset, ctx).await
    }

    async fn clean(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError> {
        self.run_step(SyncStep::Clean, ctx).await
    }

    async fn fetch(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError> {
        self.run_step(SyncStep::Fetch, ctx).await
    }

    async fn pull(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError> {
        self.run_step(SyncStep::Merge, ctx).await
    }

    async fn final_status(&self, ctx: &InvocationContext) -> Result<StepResult, ScmError> {
        self.run_step(SyncStep::FinalStatus, ctx).await
    }
}
