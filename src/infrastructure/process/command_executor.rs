use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::value_objects::process_environment::ProcessEnvironment;

/// Command executor errors
#[derive(Debug, Error)]
pub enum CommandExecutorError {
    #[error("Executable not found: {program}")]
    ExecutableNotFound { program: String },

    #[error("Working directory not found: {}", path.display())]
    WorkingDirectoryNotFound { path: PathBuf },

    #[error("Command `{command}` timed out after {timeout_seconds} seconds")]
    Timeout {
        command: String,
        timeout_seconds: u64,
    },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for `{command}`: {source}")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration for command execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// Working directory for command execution
    pub working_directory: Option<PathBuf>,

    /// Complete environment of the child; nothing is inherited
    pub environment: ProcessEnvironment,

    /// Timeout for command execution in seconds
    pub timeout_seconds: Option<u64>,
}

impl ExecutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_environment(mut self, environment: ProcessEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }
}

/// Result of command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code of the process, -1 when killed by a signal
    pub exit_code: i32,

    pub stdout: String,

    pub stderr: String,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    pub fn new(exit_code: i32, stdout: String, stderr: String, execution_time_ms: u64) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            execution_time_ms,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs from an argument vector, never through a shell
pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute `program` with `args` and capture its output.
    ///
    /// The child's environment is cleared and replaced by
    /// `config.environment`, so `program` is resolved against that
    /// environment's `PATH`. A non-zero exit status is not an error.
    pub async fn execute(
        program: &str,
        args: &[String],
        config: &ExecutionConfig,
    ) -> Result<ExecutionResult, CommandExecutorError> {
        if program.trim().is_empty() {
            return Err(CommandExecutorError::InvalidCommand(
                "Program is empty".to_string(),
            ));
        }

        let command_line = Self::display_command(program, args);

        if let Some(working_dir) = &config.working_directory {
            if !working_dir.is_dir() {
                return Err(CommandExecutorError::WorkingDirectoryNotFound {
                    path: working_dir.clone(),
                });
            }
        }

        let mut cmd = TokioCommand::new(program);
        cmd.args(args);

        if let Some(working_dir) = &config.working_directory {
            cmd.current_dir(working_dir);
        }

        cmd.env_clear();
        cmd.envs(config.environment.iter());

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        debug!(
            command = %command_line,
            env_vars = config.environment.len(),
            "spawning process"
        );

        let start_time = Instant::now();
        let child = cmd.spawn().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CommandExecutorError::ExecutableNotFound {
                    program: program.to_string(),
                }
            } else {
                CommandExecutorError::SpawnFailed {
                    command: command_line.clone(),
                    source,
                }
            }
        })?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match config.timeout_seconds {
            Some(timeout_secs) => {
                match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
                    Ok(output) => output,
                    Err(_) => {
                        return Err(CommandExecutorError::Timeout {
                            command: command_line,
                            timeout_seconds: timeout_secs,
                        })
                    }
                }
            }
            None => child.wait_with_output().await,
        }
        .map_err(|source| CommandExecutorError::WaitFailed {
            command: command_line.clone(),
            source,
        })?;

        let execution_time = start_time.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(command = %command_line, exit_code, execution_time_ms = execution_time, "process exited");

        Ok(ExecutionResult::new(
            exit_code,
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            execution_time,
        ))
    }

    /// Human-readable rendering of a command, for logs only
    pub fn display_command(program: &str, args: &[String]) -> String {
        std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::environment_builder::{
        EnvironmentBuilder, EnvironmentPolicy,
    };
    use tempfile::TempDir;

    fn sanitized_env(extra: &[(&str, &str)]) -> ProcessEnvironment {
        let mut policy = EnvironmentPolicy::default();
        policy.allow_list = extra.iter().map(|(name, _)| name.to_string()).collect();
        let ambient = extra
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()));
        EnvironmentBuilder::new(policy).build(ambient)
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn test_simple_command_execution() {
        let config = ExecutionConfig::new().with_environment(sanitized_env(&[]));
        let result = CommandExecutor::execute("echo", &args(&["Hello, World!"]), &config)
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "Hello, World!\n");
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let config = ExecutionConfig::new().with_environment(sanitized_env(&[]));
        let result = CommandExecutor::execute("echo", &args(&["$HOME; `id`"]), &config)
            .await
            .unwrap();

        assert_eq!(result.stdout, "$HOME; `id`\n");
    }

    #[tokio::test]
    async fn test_command_with_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = ExecutionConfig::new()
            .with_working_directory(temp_dir.path())
            .with_environment(sanitized_env(&[]));

        let result = CommandExecutor::execute("pwd", &[], &config).await.unwrap();

        assert!(result.success());
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(temp_dir.path()).unwrap());
    }

    #[tokio::test]
    async fn test_child_sees_only_the_given_environment() {
        std::env::set_var("REPOSYNC_EXECUTOR_LEAK_CHECK", "leaked");
        let config = ExecutionConfig::new()
            .with_environment(sanitized_env(&[("TEST_VAR", "test_value")]));

        let result = CommandExecutor::execute("env", &[], &config).await.unwrap();

        assert!(result.success());
        assert!(result.stdout.contains("TEST_VAR=test_value"));
        assert!(result.stdout.contains("PATH=/usr/bin:/bin:/usr/local/bin"));
        assert!(!result.stdout.contains("REPOSYNC_EXECUTOR_LEAK_CHECK"));
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let config = ExecutionConfig::new()
            .with_environment(sanitized_env(&[]))
            .with_timeout(1);

        let result = CommandExecutor::execute("sleep", &args(&["5"]), &config).await;

        match result {
            Err(CommandExecutorError::Timeout {
                timeout_seconds, ..
            }) => assert_eq!(timeout_seconds, 1),
            other => panic!("Expected timeout error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_command_is_not_an_error() {
        let config = ExecutionConfig::new().with_environment(sanitized_env(&[]));
        let result = CommandExecutor::execute("false", &[], &config).await.unwrap();

        assert!(!result.success());
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let config = ExecutionConfig::new().with_environment(sanitized_env(&[]));
        let result =
            CommandExecutor::execute("reposync-definitely-not-installed", &[], &config).await;

        assert!(matches!(
            result,
            Err(CommandExecutorError::ExecutableNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = ExecutionConfig::new()
            .with_working_directory(temp_dir.path().join("gone"))
            .with_environment(sanitized_env(&[]));

        let result = CommandExecutor::execute("pwd", &[], &config).await;

        assert!(matches!(
            result,
            Err(CommandExecutorError::WorkingDirectoryNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_program_is_rejected() {
        let result = CommandExecutor::execute("  ", &[], &ExecutionConfig::new()).await;
        assert!(matches!(result, Err(CommandExecutorError::InvalidCommand(_))));
    }

    #[test]
    fn test_display_command() {
        assert_eq!(
            CommandExecutor::display_command("git", &args(&["fetch", "origin", "main"])),
            "git fetch origin main"
        );
    }
}
