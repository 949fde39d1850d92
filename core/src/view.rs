//! Output and prompting capability handed to command actions.

use std::collections::VecDeque;
use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Stdin, StdinLock, Stdout, Write};

use console::Term;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::command::Command;
use crate::help::render_help;

/// Errors raised by interactive prompts.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("the question must not be blank")]
    BlankQuestion,

    #[error("input closed before an answer was read")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Application name and version shown at the top of help output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub title: String,
    pub version: String,
}

impl AppInfo {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
        }
    }
}

/// What a command action can do with the terminal.
pub trait View {
    /// Prints one line.
    fn print(&mut self, text: &str);

    /// Prints the help page of `command`.
    fn print_help(&mut self, command: &Command);

    /// Prints an error message.
    fn print_error(&mut self, error: &dyn Error);

    /// Asks `title` and returns the answer without its line terminator.
    ///
    /// # Errors
    ///
    /// [`ViewError::BlankQuestion`] if `title` is blank.
    fn ask_for(&mut self, title: &str) -> Result<String, ViewError>;

    /// Like [`ask_for`](Self::ask_for), for secrets. Interactive views must
    /// not echo the answer.
    fn ask_for_sensitive(&mut self, title: &str) -> Result<String, ViewError>;

    /// Asks a yes/no question; `true` if the answer equals `yes` ignoring case.
    fn confirm(&mut self, question: &str, yes: &str, no: &str) -> Result<bool, ViewError> {
        let answer = self.ask_for(&format!("{question} ({yes}/{no})"))?;
        Ok(answer.trim().to_lowercase() == yes.to_lowercase())
    }
}

/// A [`View`] over a line reader and a writer.
///
/// Every printed line (prompts included) is counted; with line numbers
/// enabled the count prefixes each line.
///
/// [`ask_for_sensitive`](View::ask_for_sensitive) reads from the terminal
/// with echo disabled when the view was created by [`TextView::stdio`] on an
/// interactive terminal; otherwise it reads a plain line from the input.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{AppInfo, TextView, View};
///
/// let mut view = TextView::new(&b"alice\n"[..], Vec::new(), AppInfo::default())
///     .with_line_numbers(true);
///
/// view.print("hello");
/// let name = view.ask_for("Username").unwrap();
///
/// assert_eq!(name, "alice");
/// assert_eq!(view.printed_lines(), 2);
/// assert_eq!(String::from_utf8(view.into_output()).unwrap(), "1: hello\n2: Username: ");
/// ```
pub struct TextView<R, W> {
    input: R,
    output: W,
    info: AppInfo,
    line_numbers: bool,
    debug: bool,
    printed_lines: usize,
    secure_term: Option<Term>,
}

impl TextView<StdinLock<'static>, Stdout> {
    /// A view over the process standard streams.
    pub fn stdio(info: AppInfo) -> Self {
        let stdin: Stdin = io::stdin();
        let term = Term::stdout();
        let interactive = stdin.is_terminal() && term.is_term();
        let mut view = Self::new(stdin.lock(), io::stdout(), info);
        if interactive {
            view.secure_term = Some(term);
        }
        view
    }
}

impl<R: BufRead, W: Write> TextView<R, W> {
    pub fn new(input: R, output: W, info: AppInfo) -> Self {
        Self {
            input,
            output,
            info,
            line_numbers: false,
            debug: false,
            printed_lines: 0,
            secure_term: None,
        }
    }

    /// Prefixes every line with its number.
    pub fn with_line_numbers(mut self, enabled: bool) -> Self {
        self.line_numbers = enabled;
        self
    }

    /// Enables [`print_debug`](Self::print_debug) output and error causes.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn info(&self) -> &AppInfo {
        &self.info
    }

    pub fn printed_lines(&self) -> usize {
        self.printed_lines
    }

    /// Prints `text` only in debug mode.
    pub fn print_debug(&mut self, text: &str) {
        if self.debug {
            self.print(text);
        }
    }

    /// Consumes the view, returning the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    fn write(&mut self, text: &str, newline: bool) {
        self.printed_lines += 1;
        let result = match (self.line_numbers, newline) {
            (true, true) => writeln!(self.output, "{}: {text}", self.printed_lines),
            (true, false) => write!(self.output, "{}: {text}", self.printed_lines),
            (false, true) => writeln!(self.output, "{text}"),
            (false, false) => write!(self.output, "{text}"),
        };
        if let Err(err) = result.and_then(|()| self.output.flush()) {
            warn!(error = %err, "Failed to write to view output");
        }
    }

    fn prompt(&mut self, title: &str) -> Result<(), ViewError> {
        if title.trim().is_empty() {
            return Err(ViewError::BlankQuestion);
        }
        self.write(&format!("{title}: "), false);
        Ok(())
    }

    fn ask(&mut self, title: &str) -> Result<String, ViewError> {
        self.prompt(title)?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(ViewError::Closed);
        }
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> View for TextView<R, W> {
    fn print(&mut self, text: &str) {
        self.write(text, true);
    }

    fn print_help(&mut self, command: &Command) {
        for line in render_help(command, &self.info) {
            self.print(&line);
        }
    }

    fn print_error(&mut self, error: &dyn Error) {
        self.print("");
        self.print(&format!("Error: {error}"));
        if self.debug {
            let mut source = error.source();
            while let Some(cause) = source {
                self.print(&format!("  caused by: {cause}"));
                source = cause.source();
            }
        }
        self.print("");
    }

    fn ask_for(&mut self, title: &str) -> Result<String, ViewError> {
        self.ask(title)
    }

    fn ask_for_sensitive(&mut self, title: &str) -> Result<String, ViewError> {
        let Some(term) = self.secure_term.clone() else {
            return self.ask(title);
        };
        self.prompt(title)?;
        Ok(term.read_secure_line()?)
    }
}

/// In-memory [`View`] that records output and replays scripted answers.
#[derive(Debug, Default)]
pub struct MemoryView {
    info: AppInfo,
    lines: Vec<String>,
    helps: Vec<String>,
    errors: Vec<String>,
    questions: Vec<String>,
    answers: VecDeque<String>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `answers` for successive prompts.
    pub fn with_answers<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers.extend(answers.into_iter().map(Into::into));
        self
    }

    pub fn with_info(mut self, info: AppInfo) -> Self {
        self.info = info;
        self
    }

    /// Every printed line, help pages included.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Ids of the commands whose help was printed.
    pub fn helps(&self) -> &[String] {
        &self.helps
    }

    /// Messages passed to [`View::print_error`].
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Prompts asked so far.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lines.iter().any(|line| line.contains(text))
    }

    fn ask(&mut self, title: &str) -> Result<String, ViewError> {
        if title.trim().is_empty() {
            return Err(ViewError::BlankQuestion);
        }
        self.questions.push(title.to_string());
        self.answers.pop_front().ok_or(ViewError::Closed)
    }
}

impl View for MemoryView {
    fn print(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn print_help(&mut self, command: &Command) {
        self.helps.push(command.id().to_string());
        let rendered = render_help(command, &self.info);
        self.lines.extend(rendered);
    }

    fn print_error(&mut self, error: &dyn Error) {
        self.errors.push(error.to_string());
        self.lines.push(format!("Error: {error}"));
    }

    fn ask_for(&mut self, title: &str) -> Result<String, ViewError> {
        self.ask(title)
    }

    fn ask_for_sensitive(&mut self, title: &str) -> Result<String, ViewError> {
        self.ask(title)
    }
}
