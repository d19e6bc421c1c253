//! Mock command runner for testing.
//!
//! Provides a configurable mock implementation of the CommandRunner trait
//! for use in tests without requiring the real tool to be installed.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::config::CommandSpec;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Predefined mock response for a process execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Exit with an arbitrary code and no output.
    pub fn exit(exit_code: i32) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Mock command runner.
///
/// Every spawned command is recorded; responses are handed out in the order
/// they were queued, falling back to a silent success once the queue is
/// empty. Dry-run specs never reach the mock, so an empty call log after a
/// dry-run proves nothing was executed.
#[derive(Clone, Default)]
pub struct MockRunner {
    responses: Arc<RwLock<VecDeque<MockResponse>>>,
    captured_calls: Arc<RwLock<Vec<CommandSpec>>>,
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next spawn.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push_back(response);
        self
    }

    /// Replace the response queue.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses.into();
        self
    }

    /// Make every spawn fail as if the program could not be started.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// All spawned commands, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.captured_calls.read().clone()
    }

    /// Argument lists (without the program) of all spawned commands.
    pub fn call_args(&self) -> Vec<Vec<String>> {
        self.captured_calls
            .read()
            .iter()
            .map(|c| c.args.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Whether any spawned command's first argument equals `subcommand`.
    pub fn was_called(&self, subcommand: &str) -> bool {
        self.captured_calls
            .read()
            .iter()
            .any(|c| c.args.first().map(String::as_str) == Some(subcommand))
    }

    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn spawn(&self, spec: &CommandSpec) -> RunnerResult<ExecutionResult> {
        self.captured_calls.write().push(spec.clone());

        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::ExecutionFailed(msg));
        }

        let response = self
            .responses
            .write()
            .pop_front()
            .unwrap_or_else(|| MockResponse::success(""));

        Ok(ExecutionResult {
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at: Utc::now(),
            duration_ms: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunOutcome;

    #[tokio::test]
    async fn test_mock_runner_basic() {
        let runner = MockRunner::new().add_response(MockResponse::success("test output"));

        let spec = CommandSpec::new("terraform").arg("version");
        let result = runner.spawn(&spec).await.unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "test output");
    }

    #[tokio::test]
    async fn test_mock_runner_captures_calls() {
        let runner = MockRunner::new();

        let spec = CommandSpec::new("terraform")
            .args(["plan", "-detailed-exitcode"])
            .cwd("/envs/dev");
        runner.run(&spec).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "terraform");
        assert_eq!(calls[0].args, vec!["plan", "-detailed-exitcode"]);
        assert!(runner.was_called("plan"));
        assert!(!runner.was_called("apply"));
    }

    #[tokio::test]
    async fn test_dry_run_does_not_reach_mock() {
        let runner = MockRunner::new();
        let spec = CommandSpec::new("terraform").arg("apply").dry_run(true);

        let outcome = runner.run(&spec).await.unwrap();

        assert!(matches!(outcome, RunOutcome::NotRun));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_runner_failure_simulation() {
        let runner = MockRunner::new().simulate_failure("simulated error");

        let result = runner.spawn(&CommandSpec::new("terraform")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_responses_are_consumed_in_order() {
        let runner = MockRunner::new().with_responses(vec![
            MockResponse::success("first"),
            MockResponse::failure(1, "second failed"),
        ]);
        let spec = CommandSpec::new("terraform");

        let r1 = runner.spawn(&spec).await.unwrap();
        assert_eq!(r1.stdout, "first");

        let r2 = runner.spawn(&spec).await.unwrap();
        assert_eq!(r2.exit_code, 1);
        assert_eq!(r2.stderr, "second failed");

        // Queue exhausted: default success
        let r3 = runner.spawn(&spec).await.unwrap();
        assert_eq!(r3.exit_code, 0);
        assert_eq!(runner.call_count(), 3);
    }
}
