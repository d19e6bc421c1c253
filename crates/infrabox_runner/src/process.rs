//! Subprocess-based command runner.
//!
//! Runs the requested program directly (no shell), either collecting its
//! output or letting it stream to the invoking terminal.

use std::process::Stdio;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::debug;

use crate::config::CommandSpec;
use crate::error::{RunnerError, RunnerResult};
use crate::interrupt::Interrupts;
use crate::runner::{CommandRunner, ExecutionResult};

/// Runner that spawns real processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Echo captured stdout to the terminal once the process exits
    echo_captured: bool,
    interrupts: Interrupts,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            echo_captured: true,
            interrupts: Interrupts::new(),
        }
    }

    /// Share interrupt state with a Ctrl-C handler.
    pub fn with_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = interrupts;
        self
    }

    /// Keep captured output silent (useful when the caller reports it itself).
    pub fn quiet(mut self) -> Self {
        self.echo_captured = false;
        self
    }

    fn build_command(&self, spec: &CommandSpec) -> RunnerResult<Command> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);

        if let Some(cwd) = &spec.cwd {
            if !cwd.is_dir() {
                return Err(RunnerError::MissingWorkdir(cwd.clone()));
            }
            cmd.current_dir(cwd);
        }

        if spec.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
        cmd.stdin(Stdio::null());

        Ok(cmd)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn spawn(&self, spec: &CommandSpec) -> RunnerResult<ExecutionResult> {
        let interrupted = || RunnerError::Interrupted {
            program: spec.program.clone(),
        };
        if self.interrupts.is_interrupted() {
            return Err(interrupted());
        }

        let mut cmd = self.build_command(spec)?;
        debug!("Executing: {:?} in {:?}", spec.argv(), spec.cwd);

        let spawn_error = |source: std::io::Error| RunnerError::SpawnFailed {
            program: spec.program.clone(),
            source,
        };

        let child = self.interrupts.track_child();
        let started_at = Utc::now();
        let (status, stdout, stderr) = if spec.capture_output {
            let output = cmd.output().await.map_err(spawn_error)?;
            (
                output.status,
                String::from_utf8_lossy(&output.stdout).to_string(),
                String::from_utf8_lossy(&output.stderr).to_string(),
            )
        } else {
            let status = cmd.status().await.map_err(spawn_error)?;
            (status, String::new(), String::new())
        };
        let duration_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;
        drop(child);

        let exit_code = status.code().unwrap_or(-1);

        if self.echo_captured && !stdout.is_empty() {
            println!("{}", stdout.trim_end());
        }

        // Exit codes are judged by the caller: plan exits 2 on pending changes
        debug!(
            "{} exited with code {} after {}ms",
            spec.program, exit_code, duration_ms
        );

        if self.interrupts.is_interrupted() {
            return Err(interrupted());
        }

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            started_at,
            duration_ms,
        })
    }
}
