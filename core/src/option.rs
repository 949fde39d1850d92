//! Options and their builder.

use serde::Serialize;

use crate::error::{BuildError, Result};
use crate::group::Group;
use crate::ident;
use crate::map::OrderedMap;
use crate::parameter::Parameter;

/// Id of the option injected into every command.
pub const HELP_OPTION: &str = "help";
/// Shortcut of the help option; reserved for it.
pub const HELP_SHORTCUT: &str = "h";

const MAX_DESCRIPTION: usize = 80;

/// A named switch on a command, optionally carrying parameters.
///
/// An option is selected on the command line with `--<id>` or, when it has a
/// shortcut, with `-<shortcut>`. The [`selected`](Self::selected) flag is the
/// build-time default: for grouped options it marks the group default, for
/// ungrouped options it makes the option start out selected.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CommandOption, Parameter};
///
/// let option = CommandOption::builder()
///     .id("credentials", Some("c"))
///     .description("Your username credentials path")
///     .parameter(Parameter::builder().id("path").range(1, 10).order(0).build().unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(option.id(), "credentials");
/// assert_eq!(option.shortcut(), Some("c"));
/// assert_eq!(option.parameters().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOption {
    id: String,
    shortcut: Option<String>,
    description: String,
    parameters: OrderedMap<Parameter>,
    group: Option<String>,
    selected: bool,
}

impl CommandOption {
    /// Returns a new [`OptionBuilder`].
    pub fn builder() -> OptionBuilder {
        OptionBuilder::default()
    }

    /// The `help`/`h` option every command carries.
    pub fn help() -> Self {
        Self {
            id: HELP_OPTION.to_string(),
            shortcut: Some(HELP_SHORTCUT.to_string()),
            description: "Show help on screen".to_string(),
            parameters: OrderedMap::new(),
            group: None,
            selected: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameters in declaration (and binding) order.
    pub fn parameters(&self) -> &OrderedMap<Parameter> {
        &self.parameters
    }

    /// Id of the group this option belongs to.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Build-time default selection.
    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn is_help(&self) -> bool {
        self.id == HELP_OPTION
    }
}

/// Parameters accumulated by an [`OptionBuilder`], together with the state
/// needed to check declaration order.
#[derive(Debug, Clone, Default)]
struct ParameterChain {
    parameters: OrderedMap<Parameter>,
    last_order: Option<usize>,
    optional_seen: Option<String>,
}

impl ParameterChain {
    fn push(&mut self, parameter: Parameter) -> Result<()> {
        if let Some(last) = self.last_order {
            if parameter.order() <= last {
                return Err(BuildError::InvalidParameterOrder(format!(
                    "parameter '{}' has order {} but the previous parameter has order {last}",
                    parameter.id(),
                    parameter.order()
                )));
            }
        }
        if parameter.required() {
            if let Some(optional) = &self.optional_seen {
                return Err(BuildError::InvalidParameterOrder(format!(
                    "required parameter '{}' cannot follow optional parameter '{optional}'",
                    parameter.id()
                )));
            }
        }
        if self.parameters.contains(parameter.id()) {
            return Err(BuildError::InvalidParameter(format!(
                "duplicate parameter '{}'",
                parameter.id()
            )));
        }

        self.last_order = Some(parameter.order());
        if !parameter.required() {
            self.optional_seen = Some(parameter.id().to_string());
        }
        self.parameters.insert(parameter.id().to_string(), parameter)
    }
}

/// Builder for [`CommandOption`].
///
/// Setters take the builder by value; the first invalid call is recorded and
/// reported by [`build`](Self::build) wrapped in
/// [`BuildError::InvalidOption`] with the option id.
#[derive(Debug, Clone, Default)]
pub struct OptionBuilder {
    id: Option<String>,
    shortcut: Option<String>,
    description: String,
    chain: ParameterChain,
    group: Option<String>,
    selected: bool,
    error: Option<BuildError>,
}

impl OptionBuilder {
    /// Sets the option id and optional one-letter shortcut.
    ///
    /// The shortcut `h` is reserved for the `help` option, and a `help`
    /// option always carries it: it is assigned when no shortcut is given and
    /// any other shortcut is rejected.
    pub fn id(mut self, id: &str, shortcut: Option<&str>) -> Self {
        if self.error.is_some() {
            return self;
        }
        // Keep the raw id for diagnostics even when it is rejected.
        self.id = Some(id.to_string());
        if let Err(err) = ident::option_id(id) {
            self.error = Some(err);
            return self;
        }
        if id == HELP_OPTION {
            match shortcut {
                None | Some(HELP_SHORTCUT) => {
                    self.shortcut = Some(HELP_SHORTCUT.to_string());
                }
                Some(other) => {
                    self.error = Some(BuildError::InvalidIdentifier {
                        value: other.to_string(),
                        reason: "the help option must use shortcut 'h'".to_string(),
                    });
                }
            }
            return self;
        }
        if let Some(shortcut) = shortcut {
            if let Err(err) = ident::shortcut(shortcut) {
                self.error = Some(err);
                return self;
            }
            if shortcut == HELP_SHORTCUT {
                self.error = Some(BuildError::InvalidIdentifier {
                    value: shortcut.to_string(),
                    reason: "shortcut 'h' is reserved for the help option".to_string(),
                });
                return self;
            }
            self.shortcut = Some(shortcut.to_string());
        }
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let trimmed = description.trim();
        let length = trimmed.chars().count();
        if length == 0 || length > MAX_DESCRIPTION {
            self.error = Some(BuildError::InvalidDescription(format!(
                "option description must have between 1 and {MAX_DESCRIPTION} chars"
            )));
        } else {
            self.description = trimmed.to_string();
        }
        self
    }

    /// Appends a parameter.
    ///
    /// Orders must be strictly increasing and required parameters must all
    /// precede optional ones.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.chain.push(parameter) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Joins `group`.
    pub fn group(mut self, group: &Group) -> Self {
        self.group = Some(group.id().to_string());
        self
    }

    /// Marks the option as selected by default.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Restores the pristine state: no id, no parameters, no recorded error.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Builds the option.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidOption`] wrapping the first recorded
    /// failure, or wrapping [`BuildError::InvalidIdentifier`] when no id was
    /// set.
    pub fn build(self) -> Result<CommandOption> {
        let name = self.id.clone().unwrap_or_else(|| "<unnamed>".to_string());
        if let Some(err) = self.error {
            return Err(err.in_option(&name));
        }
        let Some(id) = self.id else {
            return Err(BuildError::InvalidIdentifier {
                value: String::new(),
                reason: "option id is required".to_string(),
            }
            .in_option(&name));
        };

        Ok(CommandOption {
            id,
            shortcut: self.shortcut,
            description: self.description,
            parameters: self.chain.parameters,
            group: self.group,
            selected: self.selected,
        })
    }
}
