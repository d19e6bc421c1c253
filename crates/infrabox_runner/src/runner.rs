//! Command runner trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CommandSpec;
use crate::error::RunnerResult;

/// Result of a process execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Exit code from the process (-1 when terminated by a signal)
    pub exit_code: i32,
    /// Captured stdout (empty when output was streamed)
    pub stdout: String,
    /// Captured stderr (empty when output was streamed)
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// What happened to a requested command.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Dry-run: the command was announced but never spawned.
    NotRun,
    /// The process ran to completion.
    Completed(ExecutionResult),
}

impl RunOutcome {
    pub fn was_executed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Exit code of the process, `None` when it was not run.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NotRun => None,
            Self::Completed(result) => Some(result.exit_code),
        }
    }

    /// A skipped command counts as successful: callers assume no state changed.
    pub fn success(&self) -> bool {
        match self {
            Self::NotRun => true,
            Self::Completed(result) => result.success(),
        }
    }

    pub fn output(&self) -> String {
        match self {
            Self::NotRun => String::new(),
            Self::Completed(result) => result.combined_output(),
        }
    }
}

/// Command runner trait.
///
/// Implementors only provide [`CommandRunner::spawn`]; [`CommandRunner::run`]
/// owns the audit line and the dry-run short-circuit so every runner behaves
/// the same way there.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute the process and wait for it to exit.
    async fn spawn(&self, spec: &CommandSpec) -> RunnerResult<ExecutionResult>;

    /// Announce, then execute unless the spec is a dry-run.
    async fn run(&self, spec: &CommandSpec) -> RunnerResult<RunOutcome> {
        announce(spec);

        if spec.dry_run {
            println!("INFRABOX: 🔍 Dry-run mode: command not executed.");
            debug!("[DRY-RUN] Skipped: {}", spec);
            return Ok(RunOutcome::NotRun);
        }

        let result = self.spawn(spec).await?;
        Ok(RunOutcome::Completed(result))
    }
}

fn announce(spec: &CommandSpec) {
    let dir = spec
        .cwd
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());
    println!("\nINFRABOX: 📦 Running command: {} in {}", spec, dir);
}
