//! Operator prompts for interactive publishing.

use std::io::{self, BufRead, Write};

use anyhow::Context;

use crate::artifact::StatusEntry;

/// Operator's answer to "publish this package?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Skip,
    /// Stop before the current package; nothing further is attempted.
    Abort,
}

impl Decision {
    /// `y` proceeds, `q` aborts, anything else skips. Case-insensitive.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" => Self::Proceed,
            "q" => Self::Abort,
            _ => Self::Skip,
        }
    }
}

pub trait Prompter {
    /// Ask whether to publish `entry`, the `position`-th of `total`.
    fn confirm(
        &mut self,
        entry: &StatusEntry,
        position: usize,
        total: usize,
    ) -> anyhow::Result<Decision>;

    /// Ask whether to keep going after `entry` failed.
    fn continue_after_failure(&mut self, entry: &StatusEntry, error: &str)
        -> anyhow::Result<bool>;
}

/// Line-oriented prompter over any reader/writer pair.
///
/// End of input answers every question with "stop".
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, read answers from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{}", question).context("Failed to write prompt")?;
        self.output.flush().context("Failed to write prompt")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if read == 0 {
            writeln!(self.output).ok();
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn confirm(
        &mut self,
        entry: &StatusEntry,
        position: usize,
        total: usize,
    ) -> anyhow::Result<Decision> {
        writeln!(
            self.output,
            "\n[{}/{}] {} {} (registry: {})",
            position,
            total,
            entry.name,
            entry.local_version,
            entry.status.registry_version().unwrap_or("query failed")
        )
        .context("Failed to write prompt")?;

        Ok(match self.ask("Publish? (y = yes, n = skip, q = quit): ")? {
            Some(answer) => Decision::parse(&answer),
            None => Decision::Abort,
        })
    }

    fn continue_after_failure(
        &mut self,
        entry: &StatusEntry,
        error: &str,
    ) -> anyhow::Result<bool> {
        writeln!(self.output, "{} failed: {}", entry.name, error)
            .context("Failed to write prompt")?;

        Ok(match self.ask("Continue with the next package? (y/n): ")? {
            Some(answer) => Decision::parse(&answer) == Decision::Proceed,
            None => false,
        })
    }
}
