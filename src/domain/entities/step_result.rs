use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sync_step::SyncStep;

/// Captured output of one git sub-operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: SyncStep,

    /// Program followed by its arguments, exactly as spawned
    pub command: Vec<String>,

    pub stdout: String,

    pub stderr: String,

    pub exit_code: i32,

    pub started_at: DateTime<Utc>,

    pub duration_ms: u64,
}

impl StepResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Command line for display. Never executed.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32) -> StepResult {
        StepResult {
            step: SyncStep::Fetch,
            command: vec!["git".into(), "fetch".into(), "origin".into(), "main".into()],
            stdout: String::new(),
            stderr: String::new(),
            exit_code,
            started_at: Utc::now(),
            duration_ms: 12,
        }
    }

    #[test]
    fn test_success_follows_exit_code() {
        assert!(result(0).success());
        assert!(!result(128).success());
    }

    #[test]
    fn test_command_line() {
        assert_eq!(result(0).command_line(), "git fetch origin main");
    }
}
