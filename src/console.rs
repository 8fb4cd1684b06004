//! Operator console seam.
//!
//! Configuration building needs two kinds of interactive input: a plain
//! yes/no answer for the overwrite prompt and a no-echo secret for the
//! passphrase. Both go through the `Console` trait so the builder can be
//! driven by a scripted console in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};
use zeroize::Zeroizing;

/// Interactive input used while building a configuration.
///
/// # Contract
///
/// - `prompt_line()` returns `Ok(None)` on end-of-input. The returned line
///   has its terminator stripped and nothing else.
/// - `read_secret()` must not echo what the operator types.
/// - `is_interactive()` is false when no terminal is attached; callers
///   must not invoke `read_secret()` in that case.
pub trait Console {
    /// Whether a terminal is attached for secret input
    fn is_interactive(&self) -> bool;

    /// Print `prompt` and read one line
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Print `prompt` and read a secret with echo disabled
    fn read_secret(&mut self, prompt: &str) -> io::Result<Zeroizing<String>>;
}

/// Console backed by the process's stdin/stdout and controlling terminal.
///
/// rpassword reads the secret from the controlling terminal (`/dev/tty`),
/// not from stdin. The console only counts as interactive when both stdin
/// and stdout are terminals, so a piped or redirected run fails with
/// `NoInteractiveConsole`.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for TerminalConsole {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal() && io::stdout().is_terminal()
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        drop(stdout);

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_line_terminator(line)))
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<Zeroizing<String>> {
        rpassword::prompt_password(prompt).map(Zeroizing::new)
    }
}

/// Remove a trailing `\n` or `\r\n`, leaving other whitespace intact
pub(crate) fn strip_line_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// Console that replays pre-recorded answers.
///
/// Used by tests and by callers that drive the builder non-interactively.
/// Once the recorded lines run out, `prompt_line()` reports end-of-input.
#[derive(Default)]
pub struct ScriptedConsole {
    lines: VecDeque<String>,
    secret: Option<Zeroizing<String>>,
    prompts: Vec<String>,
}

impl ScriptedConsole {
    /// Console with no terminal and no recorded answers
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue answers for `prompt_line()`
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Simulate an attached terminal whose operator types `secret`
    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = Some(Zeroizing::new(secret.to_string()));
        self
    }

    /// Prompts shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Console for ScriptedConsole {
    fn is_interactive(&self) -> bool {
        self.secret.is_some()
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<Zeroizing<String>> {
        self.prompts.push(prompt.to_string());
        self.secret
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no terminal attached"))
    }
}
