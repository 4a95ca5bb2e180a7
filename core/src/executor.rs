//! Shell command execution with a safety gate
//!
//! Confirmed commands run through the system shell so pipes, globs and
//! redirects behave the way the user expects. Before anything is spawned
//! the command is screened against a deny list of destructive patterns and
//! parsed into shell words to reject malformed quoting early.

use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Substrings that mark a command as too destructive to run
const DANGEROUS_PATTERNS: &[&str] = &["rm -rf", "mkfs", "dd if=", "> /dev/", ":(){"];

/// Outcome of a completed command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

/// Runs confirmed commands through `sh -c`
#[derive(Debug, Default, Clone)]
pub struct CommandExecutor {
    working_dir: Option<PathBuf>,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands from `dir` instead of the process working directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Screen a command without running it
    pub fn validate(&self, command: &str) -> Result<()> {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidCommand {
                message: "empty command".to_string(),
            });
        }

        for pattern in DANGEROUS_PATTERNS {
            if trimmed.contains(pattern) {
                return Err(CoreError::ExecutionRejected {
                    reason: format!("matches destructive pattern '{pattern}'"),
                });
            }
        }

        // Catches unbalanced quotes before the shell sees them
        let words = shell_words::split(trimmed).map_err(|err| CoreError::InvalidCommand {
            message: err.to_string(),
        })?;
        if words.is_empty() {
            return Err(CoreError::InvalidCommand {
                message: "empty command".to_string(),
            });
        }
        Ok(())
    }

    /// Validate and run a command, capturing its output
    pub async fn execute(&self, command: &str) -> Result<ExecutionResult> {
        self.validate(command)?;

        tracing::debug!("executing: {command}");
        let mut child = Command::new("sh");
        child
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            child.current_dir(dir);
        }

        let output = child.output().await?;
        Ok(ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            exit_code: output.status.code(),
        })
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}
