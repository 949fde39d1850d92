//! Identifier validation shared by every named entity of the tree.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{BuildError, Result};

/// Maximum length of a command name.
pub const COMMAND_ID_MAX_LENGTH: usize = 40;
/// Maximum length of an option id.
pub const OPTION_ID_MAX_LENGTH: usize = 30;
/// Maximum length of a parameter id.
pub const PARAMETER_ID_MAX_LENGTH: usize = 30;
/// Maximum length of a group id.
pub const GROUP_ID_MAX_LENGTH: usize = 30;

/// Compiled identifier patterns, one per namespace.
pub(crate) static PATTERNS: LazyLock<IdPatterns> = LazyLock::new(IdPatterns::new);

pub(crate) struct IdPatterns {
    pub(crate) command: Regex,
    pub(crate) option: Regex,
    pub(crate) shortcut: Regex,
    pub(crate) parameter: Regex,
    pub(crate) group: Regex,
}

impl IdPatterns {
    fn new() -> Self {
        // Compile-time constants; a failure here is a typo in the pattern.
        Self {
            command: Regex::new(r"^[a-z][a-z0-9_-]*$").expect("static regex must compile"),
            option: Regex::new(r"^[a-z][a-z0-9-]*$").expect("static regex must compile"),
            shortcut: Regex::new(r"^[a-zA-Z]$").expect("static regex must compile"),
            parameter: Regex::new(r"^[a-z][a-z0-9_-]*$").expect("static regex must compile"),
            group: Regex::new(r"^[a-z][a-z0-9_-]*$").expect("static regex must compile"),
        }
    }
}

/// Validates `value` against an optional pattern and a maximum length.
///
/// A `max_length` of `0` disables the length check and a `None` pattern
/// disables the pattern check. Empty values are always rejected.
///
/// # Errors
///
/// Returns [`BuildError::InvalidIdentifier`] describing the first violated
/// rule.
///
/// # Examples
///
/// ```
/// use cmdtree_core::validate_identifier;
/// use regex::Regex;
///
/// let pattern = Regex::new(r"^[a-z]+$").unwrap();
/// assert_eq!(validate_identifier("login", Some(&pattern), 10).unwrap(), "login");
/// assert!(validate_identifier("Login", Some(&pattern), 10).is_err());
/// assert!(validate_identifier("credentials", None, 5).is_err());
/// assert!(validate_identifier("", None, 0).is_err());
/// ```
pub fn validate_identifier(
    value: &str,
    pattern: Option<&Regex>,
    max_length: usize,
) -> Result<String> {
    if value.is_empty() {
        return Err(invalid(value, "identifier cannot be empty".to_string()));
    }

    let length = value.chars().count();
    if max_length > 0 && length > max_length {
        return Err(invalid(
            value,
            format!("length {length} exceeds the maximum of {max_length}"),
        ));
    }

    if let Some(pattern) = pattern {
        if !pattern.is_match(value) {
            return Err(invalid(
                value,
                format!("does not match pattern {}", pattern.as_str()),
            ));
        }
    }

    Ok(value.to_string())
}

fn invalid(value: &str, reason: String) -> BuildError {
    BuildError::InvalidIdentifier {
        value: value.to_string(),
        reason,
    }
}

pub(crate) fn command_name(value: &str) -> Result<String> {
    validate_identifier(value, Some(&PATTERNS.command), COMMAND_ID_MAX_LENGTH)
}

pub(crate) fn option_id(value: &str) -> Result<String> {
    validate_identifier(value, Some(&PATTERNS.option), OPTION_ID_MAX_LENGTH)
}

pub(crate) fn shortcut(value: &str) -> Result<String> {
    validate_identifier(value, Some(&PATTERNS.shortcut), 1)
}

pub(crate) fn parameter_id(value: &str) -> Result<String> {
    validate_identifier(value, Some(&PATTERNS.parameter), PARAMETER_ID_MAX_LENGTH)
}

pub(crate) fn group_id(value: &str) -> Result<String> {
    validate_identifier(value, Some(&PATTERNS.group), GROUP_ID_MAX_LENGTH)
}
