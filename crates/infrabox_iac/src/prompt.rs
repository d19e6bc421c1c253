//! Interactive prompts.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::error::{IacError, IacResult};

/// Interpret a yes/no answer. Empty input selects `default`.
pub fn parse_confirmation(answer: &str, default: bool) -> bool {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return default;
    }
    matches!(answer.as_str(), "y" | "yes")
}

/// Line-oriented prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    /// Prompt on the process's own terminal.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask a yes/no question with a stated default.
    pub fn confirm(&mut self, message: &str, default: bool) -> IacResult<bool> {
        let suffix = if default { "[Y/n]" } else { "[y/N]" };
        let answer = self.read_answer(&format!("{} {}: ", message, suffix))?;
        Ok(parse_confirmation(&answer, default))
    }

    /// Ask for a value; an answer that sanitizes to nothing selects `default`.
    pub fn ask(
        &mut self,
        message: &str,
        default: &str,
        sanitize: fn(&str) -> String,
    ) -> IacResult<String> {
        let answer = self.read_answer(&format!("{} [default: {}]: ", message, default))?;
        let cleaned = sanitize(&answer);
        if cleaned.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(cleaned)
        }
    }

    fn read_answer(&mut self, prompt: &str) -> IacResult<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // stdin closed (Ctrl-D or a pipe that ran dry)
            writeln!(self.output)?;
            return Err(IacError::Interrupted);
        }
        Ok(line.trim().to_string())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
