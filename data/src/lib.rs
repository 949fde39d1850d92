//! YAML and JSON definitions of command trees.
//!
//! This crate describes a `cmdtree` application as data:
//!
//! - [`Definition`]: a serializable document with the application title,
//!   version, [`ViewSettings`] and a flat list of [`CommandDefinition`]s.
//! - [`validate_definition`]: structural checks (single root, known and
//!   acyclic subcommand references, reachability).
//! - [`build_tree`] / [`into_shell`]: conversion into a
//!   [`cmdtree_core::Command`] tree using the core builders, with actions
//!   attached from an [`ActionRegistry`].
//!
//! # Quick start
//!
//! ```no_run
//! use cmdtree_core::TextView;
//! use cmdtree_data::{ActionRegistry, Definition, into_shell};
//!
//! let definition = Definition::load("app.yml").unwrap();
//! let actions = ActionRegistry::new().register("app.run", |options, view| {
//!     view.print(&format!("{} options selected", options.selected().count()));
//!     Ok(())
//! });
//! let shell = into_shell(&definition, &actions).unwrap();
//!
//! let mut view = definition.view.apply(TextView::stdio(definition.app_info()));
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! std::process::exit(shell.execute(args.as_slice(), &mut view).exit_code());
//! ```

mod convert;
mod definition;
mod error;
mod validate;

pub use convert::{ActionRegistry, build_tree, into_shell};
pub use definition::{
    CommandDefinition, Definition, Format, OptionDefinition, ParameterDefinition, ViewSettings,
};
pub use error::{DataError, Result};
pub use validate::{DefinitionError, validate_definition};
