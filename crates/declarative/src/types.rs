//! Core types for declarative convergence

use serde::{Deserialize, Serialize};
use std::process::Output;

/// Result of applying a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Something was created
    Created,
    /// Something was modified
    Modified,
    /// Something was removed
    Removed,
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

/// A step that failed, with the error reported verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub id: String,
    pub description: String,
    pub error: String,
}

/// Summary of execution results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Failed steps in the order they were attempted
    pub failures: Vec<StepFailure>,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::Created => self.created += 1,
            ApplyResult::Modified => self.modified += 1,
            ApplyResult::Removed => self.removed += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
}

/// Output from an external command
///
/// A non-zero exit is data, not an error: callers decide what it means.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Render the failure the way the command reported it
    pub fn failure_message(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        let stderr = self.stderr_str();
        let stderr = stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{status}: {stderr}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = ExecuteSummary::default();
        summary.add_result(&ApplyResult::Created);
        summary.add_result(&ApplyResult::Modified);
        summary.add_result(&ApplyResult::Skipped {
            reason: "halted".into(),
        });

        assert_eq!(summary.total_changes(), 2);
        assert_eq!(summary.skipped, 1);
        assert!(summary.is_success());

        summary.add_result(&ApplyResult::Failed {
            error: "boom".into(),
        });
        assert!(!summary.is_success());
    }

    #[test]
    fn test_failure_message_includes_stderr() {
        let output = CommandOutput {
            stdout: Vec::new(),
            stderr: b"Error: resource 'web1' does not exist\n".to_vec(),
            success: false,
            code: Some(1),
        };
        assert_eq!(
            output.failure_message(),
            "exit status 1: Error: resource 'web1' does not exist"
        );
    }

    #[test]
    fn test_failure_message_without_stderr() {
        let output = CommandOutput {
            code: None,
            ..Default::default()
        };
        assert_eq!(output.failure_message(), "terminated by signal");
    }
}
