//! Conversion of definitions into command trees.
//!
//! Definitions carry no code, so actions are supplied separately through an
//! [`ActionRegistry`] keyed by dotted command path (`auth2.credential.test`).

use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};
use std::sync::Arc;

use cmdtree_core::{
    Action, ActionResult, Command, CommandOption, Group, Parameter, ResolvedOptions, Shell,
    TextView, View,
};
use tracing::{debug, warn};

use crate::definition::{CommandDefinition, Definition, OptionDefinition, ViewSettings};
use crate::error::Result;
use crate::validate::DefinitionError;

/// Actions to attach to the commands of a definition.
///
/// # Examples
///
/// ```
/// use cmdtree_data::ActionRegistry;
///
/// let actions = ActionRegistry::new()
///     .register("app.run", |_, view| {
///         view.print("running");
///         Ok(())
///     });
/// assert!(actions.get("app.run").is_some());
/// assert!(actions.get("app").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `action` for the command at `path`, replacing any previous
    /// one.
    pub fn register<F>(mut self, path: &str, action: F) -> Self
    where
        F: Fn(&ResolvedOptions, &mut dyn View) -> ActionResult + Send + Sync + 'static,
    {
        self.insert(path, Arc::new(action));
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, action: Action) {
        self.actions.insert(path.into(), action);
    }

    pub fn get(&self, path: &str) -> Option<&Action> {
        self.actions.get(path)
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}

impl ViewSettings {
    /// Applies these settings to `view`.
    pub fn apply<R: BufRead, W: Write>(&self, view: TextView<R, W>) -> TextView<R, W> {
        view.with_line_numbers(self.print_line_number)
            .with_debug(self.debug)
    }
}

/// Validates `definition` and builds its command tree.
///
/// Registered actions whose path names no command are logged and ignored.
///
/// # Errors
///
/// Returns [`InvalidDefinition`](crate::DataError::InvalidDefinition) for
/// structural problems and [`BuildError`](crate::DataError::BuildError)
/// when a builder rejects an id, a parameter order or a group default.
pub fn build_tree(definition: &Definition, actions: &ActionRegistry) -> Result<Command> {
    definition.validate()?;
    let root = definition.root().ok_or(DefinitionError::MissingRoot)?;
    let by_id: HashMap<&str, &CommandDefinition> = definition
        .commands
        .iter()
        .map(|c| (c.id.as_str(), c))
        .collect();

    let tree = build_command(root, &root.id, &by_id, actions)?;

    for path in actions.paths() {
        if tree.find(path).is_none() {
            warn!(path, "Action registered for unknown command");
        }
    }
    debug!(
        root = tree.id(),
        commands = tree.commands().len(),
        "Built command tree"
    );
    Ok(tree)
}

/// Builds the tree of `definition` and wraps it in a [`Shell`].
///
/// # Errors
///
/// See [`build_tree`].
pub fn into_shell(definition: &Definition, actions: &ActionRegistry) -> Result<Shell> {
    Ok(Shell::new(build_tree(definition, actions)?))
}

fn build_command(
    definition: &CommandDefinition,
    path: &str,
    by_id: &HashMap<&str, &CommandDefinition>,
    actions: &ActionRegistry,
) -> Result<Command> {
    let mut builder = Command::builder()
        .id(&definition.id)
        .description(&definition.description)
        .require_subcommand(definition.require_subcommand);

    for option in &definition.options {
        builder = builder.option(build_option(option)?);
    }
    if let Some(action) = actions.get(path) {
        builder = builder.shared_action(Arc::clone(action));
    }
    for sub in &definition.subcommands {
        let child = by_id
            .get(sub.as_str())
            .ok_or_else(|| DefinitionError::UnknownSubcommand {
                command: definition.id.clone(),
                subcommand: sub.clone(),
            })?;
        let child_path = format!("{path}.{}", child.id);
        builder = builder.sub_command(build_command(child, &child_path, by_id, actions)?);
    }

    Ok(builder.build()?)
}

fn build_option(definition: &OptionDefinition) -> Result<CommandOption> {
    let mut builder = CommandOption::builder()
        .id(&definition.id, definition.shortcut.as_deref())
        .selected(definition.selected);
    if let Some(description) = &definition.description {
        builder = builder.description(description);
    }
    if let Some(group) = &definition.group {
        builder = builder.group(&Group::builder().id(group).build()?);
    }
    for (order, parameter) in definition.parameters.iter().enumerate() {
        let mut parameter_builder = Parameter::builder()
            .id(&parameter.id)
            .order(order)
            .required(parameter.required);
        if parameter.min_length.is_some() || parameter.max_length.is_some() {
            parameter_builder = parameter_builder.range(
                parameter.min_length.unwrap_or(0),
                parameter.max_length.unwrap_or(usize::MAX),
            );
        }
        builder = builder.parameter(parameter_builder.build()?);
    }
    Ok(builder.build()?)
}
