//! # infrabox_runner
//!
//! Subprocess execution wrapper for Infrabox.
//!
//! Every external tool Infrabox drives goes through a [`CommandRunner`]:
//! the command line and working directory are announced first, dry-run
//! short-circuits before anything is spawned, and arguments are always
//! passed as an argv list (never through a shell).
//!
//! # Features
//!
//! - **Process Runner**: real subprocess execution with captured or live output
//! - **Dry-Run Mode**: print commands without executing them
//! - **Mock Runner**: for testing without the real tool installed
//! - **Interrupts**: Ctrl-C waits for a running child, aborts otherwise
//!
//! # Example
//!
//! ```rust,no_run
//! use infrabox_runner::{CommandRunner, CommandSpec, ProcessRunner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = ProcessRunner::new();
//!
//!     let spec = CommandSpec::new("terraform")
//!         .args(["init", "-input=false"])
//!         .cwd("environments/dev")
//!         .capture_output(true);
//!
//!     let outcome = runner.run(&spec).await?;
//!     println!("Exit code: {:?}", outcome.exit_code());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod interrupt;
pub mod mock;
pub mod process;
pub mod runner;

pub use config::CommandSpec;
pub use error::{RunnerError, RunnerResult};
pub use interrupt::{InterruptAction, Interrupts};
pub use mock::{MockResponse, MockRunner};
pub use process::ProcessRunner;
pub use runner::{CommandRunner, ExecutionResult, RunOutcome};
