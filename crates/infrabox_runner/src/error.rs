//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur during runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Working directory does not exist: {0}")]
    MissingWorkdir(std::path::PathBuf),

    #[error("{program} was interrupted")]
    Interrupted { program: String },
}
