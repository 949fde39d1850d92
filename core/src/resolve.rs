//! Resolution of an argument vector against a command tree.
//!
//! Resolution walks the tokens once, left to right:
//!
//! 1. leading tokens naming a child command descend into it;
//! 2. `--<id>` and `-<shortcut>` select an option of the resolved command;
//! 3. `<id>:<value>` binds a parameter of the current option by id, and a
//!    bare `<value>` binds the next unfilled parameter in declared order;
//! 4. empty and whitespace-only tokens are ignored.
//!
//! Afterwards group defaults are applied, a selected `help` option
//! short-circuits to a help request, and every selected option is checked
//! for missing required parameters.
//!
//! The command tree is never modified. Selection state and bound values are
//! collected in a fresh [`ResolvedOptions`] snapshot per call.

use std::ops::Index;

use serde::Serialize;
use tracing::debug;

use crate::command::Command;
use crate::error::{InputError, NONE_MARKER, ResolveError};
use crate::map::OrderedMap;
use crate::option::{CommandOption, HELP_OPTION};

/// A parameter slot together with the value bound to it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundParameter {
    id: String,
    required: bool,
    data: Option<String>,
}

impl BoundParameter {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// The bound value.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

/// Selection state and bound parameters of one option after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOption {
    id: String,
    shortcut: Option<String>,
    group: Option<String>,
    selected: bool,
    parameters: OrderedMap<BoundParameter>,
}

impl ResolvedOption {
    fn from_declaration(option: &CommandOption) -> Self {
        let parameters = option.parameters().map_values(|parameter| BoundParameter {
            id: parameter.id().to_string(),
            required: parameter.required(),
            data: None,
        });
        Self {
            id: option.id().to_string(),
            shortcut: option.shortcut().map(str::to_string),
            group: option.group().map(str::to_string),
            // Grouped defaults are applied after all tokens are consumed.
            selected: option.group().is_none() && option.selected(),
            parameters,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn parameters(&self) -> &OrderedMap<BoundParameter> {
        &self.parameters
    }

    /// Returns the value bound to parameter `id`.
    pub fn value(&self, id: &str) -> Option<&str> {
        self.parameters.try_get(id).and_then(BoundParameter::data)
    }
}

/// Snapshot of every option of the resolved command.
///
/// Passed to the command action. Unselected options are present with
/// `selected == false`, so actions can test any declared option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOptions {
    command: String,
    options: OrderedMap<ResolvedOption>,
}

impl ResolvedOptions {
    /// Id of the command the options belong to.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedOption> {
        self.options.try_get(id)
    }

    /// Returns `true` if option `id` exists and is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.get(id).is_some_and(ResolvedOption::selected)
    }

    /// Returns the value bound to `parameter` of `option`.
    pub fn value(&self, option: &str, parameter: &str) -> Option<&str> {
        self.get(option).and_then(|o| o.value(parameter))
    }

    /// Selected options in declaration order.
    pub fn selected(&self) -> impl Iterator<Item = &ResolvedOption> {
        self.options.values().filter(|o| o.selected)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedOption> {
        self.options.values()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl Index<&str> for ResolvedOptions {
    type Output = ResolvedOption;

    fn index(&self, id: &str) -> &ResolvedOption {
        &self.options[id]
    }
}

/// Outcome of a successful resolution.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// Run `command`'s action with `options`.
    Run {
        command: &'a Command,
        options: ResolvedOptions,
    },
    /// Render help for `command` instead of running it.
    Help { command: &'a Command },
}

impl<'a> Resolution<'a> {
    /// The command resolution ended at.
    pub fn command(&self) -> &'a Command {
        match self {
            Self::Run { command, .. } | Self::Help { command } => command,
        }
    }
}

/// Resolves `tokens` against the tree rooted at `root`.
///
/// # Errors
///
/// Returns a [`ResolveError`] naming the deepest command reached and the
/// [`InputError`] that stopped resolution.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Command, CommandOption, Parameter, Resolution, resolve};
///
/// let root = Command::builder()
///     .id("app")
///     .option(
///         CommandOption::builder()
///             .id("opt", None)
///             .parameter(Parameter::builder().id("a").range(6, 10).order(0).build().unwrap())
///             .parameter(Parameter::builder().id("b").range(6, 10).order(1).build().unwrap())
///             .build()
///             .unwrap(),
///     )
///     .build()
///     .unwrap();
///
/// let Resolution::Run { options, .. } = resolve(&root, &["--opt", "foo123", "b:bar123"]).unwrap() else {
///     panic!("expected a runnable resolution");
/// };
/// assert!(options.is_selected("opt"));
/// assert_eq!(options.value("opt", "a"), Some("foo123"));
/// assert_eq!(options.value("opt", "b"), Some("bar123"));
/// ```
pub fn resolve<'a, S: AsRef<str>>(
    root: &'a Command,
    tokens: &[S],
) -> Result<Resolution<'a>, ResolveError> {
    let tokens: Vec<&str> = tokens
        .iter()
        .map(AsRef::as_ref)
        .filter(|token| !token.trim().is_empty())
        .collect();

    let mut command = root;
    let mut consumed = 0;
    while let Some(child) = tokens.get(consumed).and_then(|token| command.child(token)) {
        debug!(command = child.id(), "Descending into subcommand");
        command = child;
        consumed += 1;
    }

    let mut binder = Binder::new(command);
    for token in &tokens[consumed..] {
        binder.consume(token).map_err(|error| ResolveError {
            command: command.id().to_string(),
            error,
        })?;
    }

    binder.finish().map_err(|error| ResolveError {
        command: command.id().to_string(),
        error,
    })
}

/// Per-resolution state for one command.
struct Binder<'a> {
    command: &'a Command,
    options: OrderedMap<ResolvedOption>,
    current: Option<String>,
    last_bound: Option<String>,
}

impl<'a> Binder<'a> {
    fn new(command: &'a Command) -> Self {
        Self {
            command,
            options: command.options().map_values(ResolvedOption::from_declaration),
            current: None,
            last_bound: None,
        }
    }

    fn consume(&mut self, token: &str) -> Result<(), InputError> {
        if let Some(id) = token.strip_prefix("--") {
            let declared = self
                .command
                .option(id)
                .ok_or_else(|| InputError::UnknownOption(token.to_string()))?;
            self.select(declared.id().to_string());
            return Ok(());
        }
        if let Some(shortcut) = token.strip_prefix('-') {
            let declared = self
                .command
                .option_by_shortcut(shortcut)
                .ok_or_else(|| InputError::UnknownOption(token.to_string()))?;
            self.select(declared.id().to_string());
            return Ok(());
        }

        let Some(option_id) = self.current.clone() else {
            return Err(InputError::ArgumentWithoutOption(token.to_string()));
        };
        match token.split_once(':') {
            Some((parameter, value)) => self.bind_named(&option_id, parameter, value),
            None => self.bind_next(&option_id, token),
        }
    }

    /// Selects `id`; selecting a grouped option deselects its siblings, so the
    /// last explicit selection within a group wins.
    fn select(&mut self, id: String) {
        debug!(command = self.command.id(), option = %id, "Selecting option");
        let group = self.options.try_get(&id).and_then(|o| o.group.clone());
        if let Some(group) = group {
            for option in self.options.values_mut() {
                if option.group.as_deref() == Some(group.as_str()) {
                    option.selected = false;
                }
            }
        }
        if let Ok(option) = self.options.get_mut(&id) {
            option.selected = true;
        }
        self.current = Some(id);
    }

    fn bind_named(&mut self, option_id: &str, parameter: &str, value: &str) -> Result<(), InputError> {
        let slot = self
            .options
            .get_mut(option_id)
            .ok()
            .and_then(|o| o.parameters.get_mut(parameter).ok())
            .ok_or_else(|| InputError::UnknownParameter {
                parameter: parameter.to_string(),
                option: option_id.to_string(),
            })?;
        if slot.data.is_some() {
            return Err(InputError::ParameterAlreadyFilled {
                parameter: parameter.to_string(),
                option: option_id.to_string(),
            });
        }
        self.check_length(option_id, parameter, value)?;
        self.store(option_id, parameter, value);
        Ok(())
    }

    fn bind_next(&mut self, option_id: &str, value: &str) -> Result<(), InputError> {
        let next = self.options.try_get(option_id).and_then(|o| {
            o.parameters
                .values()
                .find(|p| p.data.is_none())
                .map(|p| p.id.clone())
        });
        let Some(parameter) = next else {
            return Err(InputError::ParameterOutOfBound {
                value: value.to_string(),
                option: option_id.to_string(),
            });
        };
        self.check_length(option_id, &parameter, value)?;
        self.store(option_id, &parameter, value);
        Ok(())
    }

    fn check_length(&self, option_id: &str, parameter: &str, value: &str) -> Result<(), InputError> {
        let Some(declared) = self
            .command
            .option(option_id)
            .and_then(|o| o.parameters().try_get(parameter))
        else {
            return Ok(());
        };
        if declared.accepts(value) {
            return Ok(());
        }
        Err(InputError::InvalidParameterLength {
            parameter: parameter.to_string(),
            option: option_id.to_string(),
            value: value.to_string(),
            min: declared.min_length(),
            max: declared.max_length(),
        })
    }

    fn store(&mut self, option_id: &str, parameter: &str, value: &str) {
        debug!(option = option_id, parameter, value, "Binding parameter");
        if let Some(slot) = self
            .options
            .get_mut(option_id)
            .ok()
            .and_then(|o| o.parameters.get_mut(parameter).ok())
        {
            slot.data = Some(value.to_string());
        }
        self.last_bound = Some(value.to_string());
    }

    fn finish(mut self) -> Result<Resolution<'a>, InputError> {
        self.apply_group_defaults();

        if self.options.try_get(HELP_OPTION).is_some_and(|o| o.selected) {
            debug!(command = self.command.id(), "Help requested");
            return Ok(Resolution::Help {
                command: self.command,
            });
        }

        if self.command.require_subcommand() && self.command.has_children() {
            return Err(InputError::MissingSubcommand(self.command.id().to_string()));
        }

        for option in self.options.values().filter(|o| o.selected) {
            let missing: Vec<String> = option
                .parameters
                .values()
                .filter(|p| p.required && p.data.is_none())
                .map(|p| p.id.clone())
                .collect();
            if !missing.is_empty() {
                return Err(InputError::MissingRequiredParameters {
                    missing,
                    option: option.id.clone(),
                    last: self
                        .last_bound
                        .clone()
                        .unwrap_or_else(|| NONE_MARKER.to_string()),
                });
            }
        }

        Ok(Resolution::Run {
            command: self.command,
            options: ResolvedOptions {
                command: self.command.id().to_string(),
                options: self.options,
            },
        })
    }

    fn apply_group_defaults(&mut self) {
        for group in self.command.groups().values() {
            let any_selected = self
                .options
                .values()
                .any(|o| o.selected && o.group.as_deref() == Some(group.id()));
            if any_selected {
                continue;
            }
            if let Some(default) = group.default_member() {
                if let Ok(option) = self.options.get_mut(default) {
                    debug!(group = group.id(), option = default, "Applying group default");
                    option.selected = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Group, Parameter};

    fn param(id: &str, order: usize, required: bool) -> Parameter {
        Parameter::builder()
            .id(id)
            .range(6, 10)
            .order(order)
            .required(required)
            .build()
            .unwrap()
    }

    fn two_param_root() -> Command {
        Command::builder()
            .id("root")
            .option(
                CommandOption::builder()
                    .id("opt", Some("o"))
                    .parameter(param("a", 0, true))
                    .parameter(param("b", 1, true))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    fn env_root(dev_default: bool) -> Command {
        let env = Group::builder().id("env").build().unwrap();
        Command::builder()
            .id("root")
            .option(
                CommandOption::builder()
                    .id("dev", None)
                    .group(&env)
                    .selected(dev_default)
                    .build()
                    .unwrap(),
            )
            .option(CommandOption::builder().id("hom", None).group(&env).build().unwrap())
            .build()
            .unwrap()
    }

    fn run<'a>(root: &'a Command, tokens: &[&str]) -> ResolvedOptions {
        match resolve(root, tokens).unwrap() {
            Resolution::Run { options, .. } => options,
            Resolution::Help { command } => panic!("unexpected help for {}", command.id()),
        }
    }

    fn fail(root: &Command, tokens: &[&str]) -> InputError {
        resolve(root, tokens).unwrap_err().error
    }

    #[test]
    fn test_named_binding() {
        let root = two_param_root();
        let options = run(&root, &["--opt", "a:foo123", "b:bar123"]);

        assert!(options.is_selected("opt"));
        assert_eq!(options.value("opt", "a"), Some("foo123"));
        assert_eq!(options.value("opt", "b"), Some("bar123"));
    }

    #[test]
    fn test_positional_binding_matches_named() {
        let root = two_param_root();
        let named = run(&root, &["--opt", "a:foo123", "b:bar123"]);
        let positional = run(&root, &["--opt", "foo123", "bar123"]);
        assert_eq!(named, positional);
    }

    #[test]
    fn test_named_then_positional_fills_remaining_slot() {
        let root = two_param_root();
        let options = run(&root, &["-o", "b:bar123", "foo123"]);
        assert_eq!(options.value("opt", "a"), Some("foo123"));
        assert_eq!(options.value("opt", "b"), Some("bar123"));
    }

    #[test]
    fn test_value_may_contain_colons() {
        let root = two_param_root();
        let options = run(&root, &["--opt", "a:x:y:zz", "b:bar123"]);
        assert_eq!(options.value("opt", "a"), Some("x:y:zz"));
    }

    #[test]
    fn test_whitespace_tokens_ignored() {
        let root = env_root(true);
        for tokens in [vec![], vec![""], vec!["  "], vec!["  ", "   ", "         ", "  "]] {
            let options = run(&root, &tokens);
            assert!(options.is_selected("dev"));
            assert!(!options.is_selected("hom"));
        }
    }

    #[test]
    fn test_explicit_selection_overrides_default() {
        let root = env_root(true);
        let options = run(&root, &["--hom"]);
        assert!(options.is_selected("hom"));
        assert!(!options.is_selected("dev"));
    }

    #[test]
    fn test_last_explicit_selection_wins() {
        let root = env_root(false);
        let options = run(&root, &["--dev", "--hom"]);
        assert!(options.is_selected("hom"));
        assert!(!options.is_selected("dev"));

        let options = run(&root, &["--hom", "--dev"]);
        assert!(options.is_selected("dev"));
        assert!(!options.is_selected("hom"));
    }

    #[test]
    fn test_group_without_default_stays_empty() {
        let root = env_root(false);
        let options = run(&root, &[]);
        assert_eq!(options.selected().count(), 0);
    }

    #[test]
    fn test_ungrouped_default_selection() {
        let root = Command::builder()
            .id("root")
            .option(CommandOption::builder().id("verbose", None).selected(true).build().unwrap())
            .build()
            .unwrap();
        assert!(run(&root, &[]).is_selected("verbose"));
    }

    #[test]
    fn test_missing_required_parameter() {
        let root = two_param_root();
        assert_eq!(
            fail(&root, &["--opt"]),
            InputError::MissingRequiredParameters {
                missing: vec!["a".to_string(), "b".to_string()],
                option: "opt".to_string(),
                last: NONE_MARKER.to_string(),
            }
        );

        assert_eq!(
            fail(&root, &["--opt", "foo123"]),
            InputError::MissingRequiredParameters {
                missing: vec!["b".to_string()],
                option: "opt".to_string(),
                last: "foo123".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_option_keeps_dashes() {
        let root = two_param_root();
        assert_eq!(
            fail(&root, &["--does-not-exist"]),
            InputError::UnknownOption("--does-not-exist".to_string())
        );
        assert_eq!(fail(&root, &["-x"]), InputError::UnknownOption("-x".to_string()));
        assert_eq!(fail(&root, &["-"]), InputError::UnknownOption("-".to_string()));
    }

    #[test]
    fn test_unknown_parameter() {
        let root = two_param_root();
        assert_eq!(
            fail(&root, &["--opt", "c:foo123"]),
            InputError::UnknownParameter {
                parameter: "c".to_string(),
                option: "opt".to_string(),
            }
        );
    }

    #[test]
    fn test_parameter_already_filled() {
        let root = two_param_root();
        assert_eq!(
            fail(&root, &["--opt", "foo123", "a:bar123"]),
            InputError::ParameterAlreadyFilled {
                parameter: "a".to_string(),
                option: "opt".to_string(),
            }
        );
    }

    #[test]
    fn test_parameter_out_of_bound() {
        let root = two_param_root();
        assert_eq!(
            fail(&root, &["--opt", "foo123", "bar123", "baz123"]),
            InputError::ParameterOutOfBound {
                value: "baz123".to_string(),
                option: "opt".to_string(),
            }
        );
    }

    #[test]
    fn test_argument_without_option() {
        let root = two_param_root();
        assert_eq!(
            fail(&root, &["a:foo123"]),
            InputError::ArgumentWithoutOption("a:foo123".to_string())
        );
    }

    #[test]
    fn test_parameter_length_enforced() {
        let root = two_param_root();
        assert!(matches!(
            fail(&root, &["--opt", "short", "bar123"]),
            InputError::InvalidParameterLength { ref parameter, min: 6, max: 10, .. } if parameter == "a"
        ));
    }

    #[test]
    fn test_help_short_circuits() {
        let root = two_param_root();
        for tokens in [&["--help"][..], &["-h"][..], &["--opt", "-h"][..]] {
            let resolution = resolve(&root, tokens).unwrap();
            assert!(matches!(resolution, Resolution::Help { command } if command.id() == "root"));
        }
    }

    #[test]
    fn test_custom_help_answers_shortcut() {
        let custom = CommandOption::builder()
            .id("help", None)
            .description("Custom help text")
            .build()
            .unwrap();
        let root = Command::builder().id("root").option(custom).build().unwrap();

        for tokens in [&["-h"][..], &["--help"][..]] {
            let resolution = resolve(&root, tokens).unwrap();
            assert!(matches!(resolution, Resolution::Help { command } if command.id() == "root"));
        }
    }

    #[test]
    fn test_descends_into_subcommands() {
        let test = Command::builder()
            .id("test")
            .option(
                CommandOption::builder()
                    .id("time-to-expire", Some("t"))
                    .parameter(Parameter::builder().id("hours").range(1, 2).order(0).build().unwrap())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let credential = Command::builder().id("credential").sub_command(test).build().unwrap();
        let root = Command::builder().id("auth2").sub_command(credential).build().unwrap();

        let resolution = resolve(&root, &["credential", " ", "test", "-t", "12"]).unwrap();
        let Resolution::Run { command, options } = resolution else {
            panic!("expected run");
        };
        assert_eq!(command.id(), "auth2.credential.test");
        assert_eq!(options.command(), "auth2.credential.test");
        assert_eq!(options.value("time-to-expire", "hours"), Some("12"));

        // Descent stops at the first non-child token.
        let err = resolve(&root, &["credential", "nope"]).unwrap_err();
        assert_eq!(err.command, "auth2.credential");
        assert_eq!(err.error, InputError::ArgumentWithoutOption("nope".to_string()));
    }

    #[test]
    fn test_require_subcommand() {
        let root = Command::builder()
            .id("root")
            .require_subcommand(true)
            .sub_command(Command::builder().id("child").build().unwrap())
            .build()
            .unwrap();

        assert_eq!(
            fail(&root, &[]),
            InputError::MissingSubcommand("root".to_string())
        );
        assert!(matches!(resolve(&root, &["-h"]).unwrap(), Resolution::Help { .. }));
        assert!(matches!(resolve(&root, &["child"]).unwrap(), Resolution::Run { .. }));
    }

    #[test]
    fn test_repeated_resolution_is_independent() {
        let root = two_param_root();
        let first = run(&root, &["--opt", "foo123", "bar123"]);
        let second = run(&root, &[]);

        assert!(first.is_selected("opt"));
        assert!(!second.is_selected("opt"));
        assert_eq!(second.value("opt", "a"), None);
    }
}
