//! Command tree model, builders and argument resolution.
//!
//! This crate models a command-line application as a tree:
//!
//! - [`Command`]: a node of the tree, with options, child commands and an
//!   optional [`Action`].
//! - [`CommandOption`]: a `--name`/`-c` switch, possibly carrying
//!   [`Parameter`]s and possibly member of a mutually-exclusive [`Group`].
//! - [`Parameter`]: an ordered, length-bounded argument slot of an option.
//!
//! Every entity is assembled with a consuming builder whose
//! [`build`](CommandBuilder::build) step reports the first invalid call as a
//! [`BuildError`].
//!
//! [`resolve`] matches an argument vector against a tree and returns a
//! [`Resolution`]: either a command to run with its [`ResolvedOptions`], or a
//! help request. [`Shell::execute`] wraps resolution, runs the action against
//! a [`View`], and reports rejected input without returning an error.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let login = Command::builder()
//!     .id("login")
//!     .description("User login command for system")
//!     .option(
//!         CommandOption::builder()
//!             .id("user", Some("u"))
//!             .description("Login user")
//!             .parameter(Parameter::builder().id("name").range(1, 20).order(0).build().unwrap())
//!             .build()
//!             .unwrap(),
//!     )
//!     .action(|options, view| {
//!         let name = options.value("user", "name").unwrap_or("anonymous");
//!         view.print(&format!("logged in as {name}"));
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! let shell = Shell::new(Command::builder().id("auth2").sub_command(login).build().unwrap());
//! let mut view = MemoryView::new();
//!
//! assert_eq!(shell.execute(&["login", "-u", "mani"], &mut view), Execution::Completed);
//! assert_eq!(view.lines(), ["logged in as mani"]);
//! ```

mod command;
mod error;
mod group;
mod help;
mod ident;
mod map;
mod option;
mod parameter;
mod resolve;
mod shell;
mod view;

pub use command::{Action, ActionResult, Command, CommandBuilder};
pub use error::{BuildError, InputError, NONE_MARKER, ResolveError, Result};
pub use group::{Group, GroupBuilder};
pub use help::render_help;
pub use ident::{
    COMMAND_ID_MAX_LENGTH, GROUP_ID_MAX_LENGTH, OPTION_ID_MAX_LENGTH, PARAMETER_ID_MAX_LENGTH,
    validate_identifier,
};
pub use map::OrderedMap;
pub use option::{CommandOption, HELP_OPTION, HELP_SHORTCUT, OptionBuilder};
pub use parameter::{Parameter, ParameterBuilder};
pub use resolve::{BoundParameter, Resolution, ResolvedOption, ResolvedOptions, resolve};
pub use shell::{Execution, Shell};
pub use view::{AppInfo, MemoryView, TextView, View, ViewError};
