//! Error types for IaC module.

use std::path::PathBuf;

use thiserror::Error;

use infrabox_runner::RunnerError;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur during IaC operations.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Invalid environment: {name} ({reason})")]
    InvalidEnvironment { name: String, reason: String },

    #[error("Environment directory '{name}' does not exist at {}", .path.display())]
    EnvironmentNotFound { name: String, path: PathBuf },

    #[error("Environment files for environment '{name}' already exist at {}", .path.display())]
    EnvironmentAlreadyExists { name: String, path: PathBuf },

    #[error("Shared provider.tf not found at {}", .0.display())]
    MissingSharedResource(PathBuf),

    #[error("Terraform command `{command}` failed with exit code {exit_code}:\n{output}")]
    ExternalCommandFailure {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template variable not provided: {0}")]
    MissingVariable(String),

    #[error("Interrupted while waiting for input or a running command")]
    Interrupted,

    #[error("Invalid configuration in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Runner error: {0}")]
    Runner(RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IacError {
    pub(crate) fn invalid_environment(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEnvironment {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<RunnerError> for IacError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Interrupted { .. } => Self::Interrupted,
            other => Self::Runner(other),
        }
    }
}
