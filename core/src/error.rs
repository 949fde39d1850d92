//! Error types for command tree construction and argument resolution.
//!
//! Two families of failures exist:
//!
//! - [`BuildError`]: raised while assembling parameters, options, groups and
//!   commands. These are programming errors of the application author and
//!   abort the construction step that raised them.
//! - [`InputError`]: raised while resolving an argument vector. These are
//!   caused by end-user input and are reported through the view by
//!   [`Shell::execute`](crate::Shell::execute).

use thiserror::Error;

/// Placeholder used in diagnostics when no parameter value was bound yet.
pub const NONE_MARKER: &str = "<none>";

/// Errors raised while building the command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An identifier is empty, too long, or does not match its pattern.
    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    /// A parameter was built with missing or inconsistent fields.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Parameter declaration order is not strictly increasing, or a required
    /// parameter follows an optional one.
    #[error("invalid parameter order: {0}")]
    InvalidParameterOrder(String),

    /// A description is blank or too long.
    #[error("invalid description: {0}")]
    InvalidDescription(String),

    /// An option could not be built; wraps the underlying cause.
    #[error("invalid option '{option}': {source}")]
    InvalidOption {
        option: String,
        source: Box<BuildError>,
    },

    /// Two members of the same group were marked as default.
    #[error("group '{group}' already defaults to '{existing}', cannot also default to '{option}'")]
    ConflictingGroupDefault {
        group: String,
        existing: String,
        option: String,
    },

    /// A command could not be built; wraps the underlying cause.
    #[error("invalid command '{command}': {source}")]
    InvalidCommand {
        command: String,
        source: Box<BuildError>,
    },

    /// A key was inserted twice into an [`OrderedMap`](crate::OrderedMap).
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A key was looked up in an [`OrderedMap`](crate::OrderedMap) but is absent.
    #[error("key not found: {0}")]
    NotFound(String),
}

impl BuildError {
    /// Returns the innermost cause, skipping option and command wrappers.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::BuildError;
    ///
    /// let err = BuildError::InvalidOption {
    ///     option: "opt".into(),
    ///     source: Box::new(BuildError::InvalidParameterOrder("b".into())),
    /// };
    /// assert!(matches!(err.innermost(), BuildError::InvalidParameterOrder(_)));
    /// ```
    pub fn innermost(&self) -> &BuildError {
        match self {
            Self::InvalidOption { source, .. } | Self::InvalidCommand { source, .. } => {
                source.innermost()
            }
            other => other,
        }
    }

    pub(crate) fn in_option(self, option: &str) -> Self {
        Self::InvalidOption {
            option: option.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn in_command(self, command: &str) -> Self {
        Self::InvalidCommand {
            command: command.to_string(),
            source: Box::new(self),
        }
    }
}

/// Errors caused by end-user input during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// A `--name` or `-c` token names no option of the current command.
    #[error("the option '{0}' is invalid")]
    UnknownOption(String),

    /// A `name:value` token names no parameter of the current option.
    #[error("the parameter '{parameter}' is invalid for option '{option}'")]
    UnknownParameter { parameter: String, option: String },

    /// A parameter received a second value.
    #[error("the parameter '{parameter}' of option '{option}' was already filled")]
    ParameterAlreadyFilled { parameter: String, option: String },

    /// A positional value arrived after every parameter slot was filled.
    #[error("the argument '{value}' is out of bound for option '{option}'")]
    ParameterOutOfBound { value: String, option: String },

    /// A value arrived before any option was selected.
    #[error("the argument '{0}' must be preceded by a valid option")]
    ArgumentWithoutOption(String),

    /// A selected option is missing required parameter data.
    #[error(
        "required parameters [{}] of option '{option}' were not filled (last bound value: {last})",
        .missing.join(",")
    )]
    MissingRequiredParameters {
        missing: Vec<String>,
        option: String,
        last: String,
    },

    /// A bound value is shorter or longer than the parameter allows.
    #[error(
        "the parameter '{parameter}' of option '{option}' must have between {min} and {max} chars, got '{value}'"
    )]
    InvalidParameterLength {
        parameter: String,
        option: String,
        value: String,
        min: usize,
        max: usize,
    },

    /// The resolved command only groups subcommands and none was given.
    #[error("the command '{0}' requires a subcommand")]
    MissingSubcommand(String),
}

/// A resolution failure together with the deepest command resolved before
/// the failure, so callers can render help for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ResolveError {
    /// Dotted id of the nearest resolved command.
    pub command: String,
    /// What went wrong.
    pub error: InputError,
}

/// Convenience alias for builder results.
pub type Result<T> = std::result::Result<T, BuildError>;
