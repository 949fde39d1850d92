//! Commands, the nodes of the invocation tree, and their builder.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{BuildError, Result};
use crate::group::Group;
use crate::ident;
use crate::map::OrderedMap;
use crate::option::CommandOption;
use crate::resolve::ResolvedOptions;
use crate::view::View;

/// Result returned by a command action.
pub type ActionResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Callback run when a command resolves successfully.
pub type Action = Arc<dyn Fn(&ResolvedOptions, &mut dyn View) -> ActionResult + Send + Sync>;

/// A node of the command tree.
///
/// The root command owns its whole subtree. A command's [`id`](Self::id) is
/// the dot-separated path of names from the root (`auth2.credential.test`),
/// and its [`parent`](Self::parent) is the parent's id rather than a
/// reference. Commands are immutable once built; resolution never modifies
/// them, so a tree can be resolved any number of times.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Command, CommandOption};
///
/// let login = Command::builder()
///     .id("login")
///     .description("User login command for system")
///     .option(CommandOption::builder().id("prompt", Some("p")).build().unwrap())
///     .build()
///     .unwrap();
///
/// let root = Command::builder()
///     .id("auth2")
///     .sub_command(login)
///     .build()
///     .unwrap();
///
/// let login = root.child("login").unwrap();
/// assert_eq!(login.id(), "auth2.login");
/// assert_eq!(login.parent(), Some("auth2"));
/// assert_eq!(login.order(), 1);
/// assert!(login.options().contains("help"));
/// assert_eq!(root.find("auth2.login").map(Command::name), Some("login"));
/// ```
#[derive(Clone)]
pub struct Command {
    id: String,
    name: String,
    description: String,
    options: OrderedMap<CommandOption>,
    shortcuts: HashMap<String, String>,
    groups: OrderedMap<Group>,
    children: OrderedMap<Command>,
    parent: Option<String>,
    order: usize,
    require_subcommand: bool,
    action: Option<Action>,
}

impl Command {
    /// Returns a new [`CommandBuilder`].
    pub fn builder() -> CommandBuilder {
        CommandBuilder::default()
    }

    /// Dotted path from the root.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last segment of the id; the token that selects this command.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Options in declaration order; always contains `help`.
    pub fn options(&self) -> &OrderedMap<CommandOption> {
        &self.options
    }

    /// Groups referenced by this command's options.
    pub fn groups(&self) -> &OrderedMap<Group> {
        &self.groups
    }

    /// Child commands keyed by name, in declaration order.
    pub fn children(&self) -> &OrderedMap<Command> {
        &self.children
    }

    /// Id of the parent command; `None` for the root.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// `0` for the root, otherwise the 1-based declaration index among
    /// siblings.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Whether resolving to this command without a subcommand is an error.
    pub fn require_subcommand(&self) -> bool {
        self.require_subcommand
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Looks up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Command> {
        self.children.try_get(name)
    }

    /// Looks up an option by id.
    pub fn option(&self, id: &str) -> Option<&CommandOption> {
        self.options.try_get(id)
    }

    /// Looks up an option by its one-letter shortcut.
    pub fn option_by_shortcut(&self, shortcut: &str) -> Option<&CommandOption> {
        self.shortcuts
            .get(shortcut)
            .and_then(|id| self.options.try_get(id))
    }

    /// Finds this command or a descendant by dotted id.
    pub fn find(&self, id: &str) -> Option<&Command> {
        if id == self.id {
            return Some(self);
        }
        let rest = id.strip_prefix(self.id.as_str())?.strip_prefix('.')?;
        let name = rest.split('.').next()?;
        self.child(name)?.find(id)
    }

    /// This command followed by all descendants, depth first in declaration
    /// order.
    pub fn commands(&self) -> Vec<&Command> {
        let mut out = vec![self];
        for child in self.children.values() {
            out.extend(child.commands());
        }
        out
    }

    fn add_option(&mut self, option: CommandOption) -> Result<()> {
        if self.options.contains(option.id()) {
            return Err(BuildError::DuplicateKey(format!("option '{}'", option.id())));
        }
        if let Some(shortcut) = option.shortcut() {
            if let Some(existing) = self.shortcuts.get(shortcut) {
                return Err(BuildError::DuplicateKey(format!(
                    "shortcut '{shortcut}' of option '{}' is already used by '{existing}'",
                    option.id()
                )));
            }
        }
        if let Some(group_id) = option.group() {
            if !self.groups.contains(group_id) {
                let group = Group::builder().id(group_id).build()?;
                self.groups.insert(group_id, group)?;
            }
            self.groups
                .get_mut(group_id)?
                .add_member(option.id(), option.selected())?;
        }

        if let Some(shortcut) = option.shortcut() {
            self.shortcuts
                .insert(shortcut.to_string(), option.id().to_string());
        }
        self.options.insert(option.id().to_string(), option)
    }

    fn add_child(&mut self, mut child: Command) -> Result<()> {
        if self.children.contains(&child.name) {
            return Err(BuildError::DuplicateKey(format!(
                "subcommand '{}'",
                child.name
            )));
        }
        child.order = self.children.len() + 1;
        child.reparent(&self.id);
        self.children.insert(child.name.clone(), child)
    }

    fn reparent(&mut self, parent_id: &str) {
        self.id = format!("{parent_id}.{}", self.name);
        self.parent = Some(parent_id.to_string());
        let id = self.id.clone();
        for child in self.children.values_mut() {
            child.reparent(&id);
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("groups", &self.groups)
            .field("children", &self.children)
            .field("parent", &self.parent)
            .field("order", &self.order)
            .field("require_subcommand", &self.require_subcommand)
            .field("action", &self.action.as_ref().map(|_| "<action>"))
            .finish()
    }
}

/// Builder for [`Command`].
///
/// Options and subcommands are collected as given and checked when
/// [`build`](Self::build) attaches them: duplicate option ids, colliding
/// shortcuts, duplicate subcommand names and conflicting group defaults all
/// fail the build with [`BuildError::InvalidCommand`].
#[derive(Default)]
pub struct CommandBuilder {
    name: Option<String>,
    description: String,
    action: Option<Action>,
    options: Vec<CommandOption>,
    children: Vec<Command>,
    require_subcommand: bool,
    error: Option<BuildError>,
}

impl CommandBuilder {
    /// Sets the command name (a single path segment).
    pub fn id(mut self, name: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.name = Some(name.to_string());
        if let Err(err) = ident::command_name(name) {
            self.error = Some(err);
        }
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.trim().to_string();
        self
    }

    /// Sets the callback run when this command resolves.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&ResolvedOptions, &mut dyn View) -> ActionResult + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Sets an already shared callback.
    pub fn shared_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn sub_command(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    /// Makes resolving to this command without a subcommand an error.
    pub fn require_subcommand(mut self, require: bool) -> Self {
        self.require_subcommand = require;
        self
    }

    /// Builds the command, injecting the `help` option when absent.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidCommand`] wrapping the first failure.
    pub fn build(self) -> Result<Command> {
        let label = self.name.clone().unwrap_or_else(|| "<unnamed>".to_string());
        if let Some(err) = self.error {
            return Err(err.in_command(&label));
        }
        let Some(name) = self.name else {
            return Err(BuildError::InvalidIdentifier {
                value: String::new(),
                reason: "command id is required".to_string(),
            }
            .in_command(&label));
        };

        let mut command = Command {
            id: name.clone(),
            name,
            description: self.description,
            options: OrderedMap::new(),
            shortcuts: HashMap::new(),
            groups: OrderedMap::new(),
            children: OrderedMap::new(),
            parent: None,
            order: 0,
            require_subcommand: self.require_subcommand,
            action: self.action,
        };

        for option in self.options {
            command
                .add_option(option)
                .map_err(|err| err.in_command(&label))?;
        }
        if !command.options.contains(crate::option::HELP_OPTION) {
            command
                .add_option(CommandOption::help())
                .map_err(|err| err.in_command(&label))?;
        }
        for child in self.children {
            command
                .add_child(child)
                .map_err(|err| err.in_command(&label))?;
        }

        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(id: &str, shortcut: Option<&str>) -> CommandOption {
        CommandOption::builder().id(id, shortcut).build().unwrap()
    }

    fn leaf(name: &str) -> Command {
        Command::builder().id(name).build().unwrap()
    }

    #[test]
    fn test_help_is_injected() {
        let command = leaf("root");
        let help = command.option("help").unwrap();
        assert_eq!(help.shortcut(), Some("h"));
        assert_eq!(command.option_by_shortcut("h").map(|o| o.id()), Some("help"));
    }

    #[test]
    fn test_custom_help_is_kept() {
        let custom = CommandOption::builder()
            .id("help", Some("h"))
            .description("Custom help text")
            .build()
            .unwrap();
        let command = Command::builder().id("root").option(custom).build().unwrap();

        assert_eq!(command.options().len(), 1);
        assert_eq!(command.option("help").unwrap().description(), "Custom help text");
    }

    #[test]
    fn test_duplicate_option_rejected() {
        let err = Command::builder()
            .id("root")
            .option(flag("dev", None))
            .option(flag("dev", None))
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::InvalidCommand { ref command, .. } if command == "root"));
        assert!(matches!(err.innermost(), BuildError::DuplicateKey(_)));
    }

    #[test]
    fn test_shortcut_collision_rejected() {
        let err = Command::builder()
            .id("root")
            .option(flag("dev", Some("d")))
            .option(flag("debug", Some("d")))
            .build()
            .unwrap_err();

        assert!(matches!(err.innermost(), BuildError::DuplicateKey(msg) if msg.contains("'d'")));
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let err = Command::builder()
            .id("root")
            .sub_command(leaf("login"))
            .sub_command(leaf("login"))
            .build()
            .unwrap_err();

        assert!(matches!(err.innermost(), BuildError::DuplicateKey(_)));
    }

    #[test]
    fn test_conflicting_group_default_rejected() {
        let env = Group::builder().id("env").build().unwrap();
        let err = Command::builder()
            .id("root")
            .option(CommandOption::builder().id("dev", None).group(&env).selected(true).build().unwrap())
            .option(CommandOption::builder().id("hom", None).group(&env).selected(true).build().unwrap())
            .build()
            .unwrap_err();

        assert!(matches!(
            err.innermost(),
            BuildError::ConflictingGroupDefault { group, .. } if group == "env"
        ));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let err = Command::builder().id("Auth 2").build().unwrap_err();
        assert!(matches!(err.innermost(), BuildError::InvalidIdentifier { .. }));

        let err = Command::builder().build().unwrap_err();
        assert!(matches!(err, BuildError::InvalidCommand { ref command, .. } if command == "<unnamed>"));
    }

    #[test]
    fn test_nested_ids_and_order() {
        let test = leaf("test");
        let credential = Command::builder()
            .id("credential")
            .sub_command(test)
            .build()
            .unwrap();
        let root = Command::builder()
            .id("auth2")
            .sub_command(leaf("login"))
            .sub_command(credential)
            .build()
            .unwrap();

        assert_eq!(root.order(), 0);
        assert_eq!(root.parent(), None);

        let credential = root.child("credential").unwrap();
        assert_eq!(credential.order(), 2);
        assert_eq!(credential.id(), "auth2.credential");

        let test = credential.child("test").unwrap();
        assert_eq!(test.id(), "auth2.credential.test");
        assert_eq!(test.parent(), Some("auth2.credential"));
        assert_eq!(test.order(), 1);

        assert_eq!(root.find("auth2.credential.test").map(Command::id), Some(test.id()));
        assert!(root.find("auth2.credential.nope").is_none());
        assert!(root.find("other").is_none());

        let ids: Vec<_> = root.commands().into_iter().map(Command::id).collect();
        assert_eq!(
            ids,
            ["auth2", "auth2.login", "auth2.credential", "auth2.credential.test"]
        );
    }
}
