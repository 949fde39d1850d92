//! The execution entry point.

use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::ResolveError;
use crate::resolve::{Resolution, resolve};
use crate::view::View;

/// How an [`execute`](Shell::execute) call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// An action ran and succeeded.
    Completed,
    /// Help was rendered instead of running an action.
    Help,
    /// Input was rejected or the action failed; the error was printed.
    Failed,
}

impl Execution {
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Process exit code: `0` unless failed.
    pub fn exit_code(self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Owns a command tree and runs argument vectors against it.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Command, CommandOption, Execution, MemoryView, Shell, View};
///
/// let root = Command::builder()
///     .id("greet")
///     .option(CommandOption::builder().id("loud", Some("l")).build().unwrap())
///     .action(|options, view| {
///         let text = if options.is_selected("loud") { "HELLO" } else { "hello" };
///         view.print(text);
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// let shell = Shell::new(root);
/// let mut view = MemoryView::new();
///
/// assert_eq!(shell.execute(&["-l"], &mut view), Execution::Completed);
/// assert_eq!(shell.execute(&["--quiet"], &mut view), Execution::Failed);
/// assert_eq!(view.lines()[0], "HELLO");
/// ```
#[derive(Debug, Clone)]
pub struct Shell {
    root: Command,
}

impl Shell {
    pub fn new(root: Command) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    /// Resolves `args` without running anything.
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<Resolution<'_>, ResolveError> {
        resolve(&self.root, args)
    }

    /// Resolves `args` and runs the selected action, or renders help.
    ///
    /// Errors never escape: rejected input is printed through the view
    /// followed by the help page of the nearest resolved command, and action
    /// errors are printed through the view.
    pub fn execute<S: AsRef<str>>(&self, args: &[S], view: &mut dyn View) -> Execution {
        match self.resolve(args) {
            Ok(Resolution::Run { command, options }) => {
                let Some(action) = command.action() else {
                    debug!(command = command.id(), "Command has no action, showing help");
                    view.print_help(command);
                    return Execution::Help;
                };
                info!(command = command.id(), "Running command");
                match action(&options, view) {
                    Ok(()) => Execution::Completed,
                    Err(err) => {
                        warn!(command = command.id(), error = %err, "Command action failed");
                        view.print_error(&*err);
                        Execution::Failed
                    }
                }
            }
            Ok(Resolution::Help { command }) => {
                view.print_help(command);
                Execution::Help
            }
            Err(err) => {
                warn!(command = %err.command, error = %err.error, "Rejected input");
                view.print_error(&err);
                let nearest = self.root.find(&err.command).unwrap_or(&self.root);
                view.print_help(nearest);
                Execution::Failed
            }
        }
    }
}
