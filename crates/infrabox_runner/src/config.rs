//! Command configuration types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single external command invocation.
///
/// The program and its arguments are kept as separate argv entries and are
/// handed to the OS as-is; nothing is ever joined into a shell string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program to execute, resolved through `PATH`
    pub program: String,
    /// Arguments passed verbatim
    pub args: Vec<String>,
    /// Working directory for the process
    pub cwd: Option<PathBuf>,
    /// Announce the command but do not execute it
    pub dry_run: bool,
    /// Collect stdout/stderr instead of streaming them to the terminal
    pub capture_output: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            dry_run: false,
            capture_output: true,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn capture_output(mut self, enabled: bool) -> Self {
        self.capture_output = enabled;
        self
    }

    /// The full argv, program first.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Human-readable command line for logging.
    pub fn display_command(&self) -> String {
        self.argv()
            .iter()
            .map(|arg| {
                if arg.is_empty() || arg.contains(char::is_whitespace) {
                    format!("'{}'", arg)
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_command())
    }
}
