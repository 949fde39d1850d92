//! Serializable command tree definitions.
//!
//! A definition describes a whole application in a flat list of commands.
//! Exactly one command is the root; the others are attached by listing their
//! ids under a parent's `subcommands`.
//!
//! # Example YAML
//!
//! ```yaml
//! title: Auth 2 API - CLI
//! version: "1.0"
//! view:
//!   print_line_number: false
//!   debug: false
//! commands:
//!   - id: auth2
//!     root: true
//!     description: Execute Auth 2 API CLI Application
//!     options:
//!       - id: development
//!         shortcut: d
//!         group: environment
//!         selected: true
//!       - id: production
//!         shortcut: p
//!         group: environment
//!     subcommands: [login]
//!   - id: login
//!     description: User login command for system
//!     options:
//!       - id: credentials
//!         shortcut: c
//!         description: Your username credentials path
//!         parameters:
//!           - id: path
//!             min_length: 1
//!             max_length: 10
//! ```

use std::collections::HashSet;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use cmdtree_core::{AppInfo, Command, CommandOption};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::validate::{DefinitionError, validate_definition};

/// On-disk encoding of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Picks the format from a file extension; anything but `.json` is
    /// parsed as YAML, which also accepts JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Output settings for the text view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Prefix every printed line with its number.
    #[serde(default)]
    pub print_line_number: bool,
    /// Print debug lines and error causes.
    #[serde(default)]
    pub debug: bool,
}

/// A parameter slot. Its order is its index in the option's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub id: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Id of the mutually-exclusive group this option joins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Default selection; the group default for grouped options.
    #[serde(default)]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Command name, unique within the definition.
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub root: bool,
    #[serde(default)]
    pub require_subcommand: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDefinition>,
    /// Ids of child commands, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<String>,
}

/// A complete application definition.
///
/// # Examples
///
/// ```
/// use cmdtree_data::Definition;
///
/// let yaml = r#"
/// title: Greeter
/// version: "0.1"
/// commands:
///   - id: greet
///     root: true
///     options:
///       - id: name
///         parameters:
///           - id: value
/// "#;
/// let definition = Definition::from_yaml_str(yaml).unwrap();
/// assert!(definition.validate().is_ok());
/// assert_eq!(definition.root().map(|c| c.id.as_str()), Some("greet"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub view: ViewSettings,
    pub commands: Vec<CommandDefinition>,
}

impl Definition {
    /// Loads a definition, choosing JSON or YAML by file extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DataError::IoError) if the file cannot be
    /// read, or [`JsonError`](crate::DataError::JsonError) /
    /// [`YamlError`](crate::DataError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path);
        debug!(path = %path.display(), ?format, "Loading definition");
        let reader = BufReader::new(std::fs::File::open(path)?);
        let definition = match format {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(definition)
    }

    /// Saves the definition, choosing JSON or YAML by file extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DataError::IoError) if the file cannot be
    /// written, or a serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match Format::from_path(path) {
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the structural rules of the definition, reporting the first
    /// violation.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDefinition`](crate::DataError::InvalidDefinition).
    pub fn validate(&self) -> Result<()> {
        match validate_definition(self).into_iter().next() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// The command marked as root, if exactly one is.
    pub fn root(&self) -> Option<&CommandDefinition> {
        let mut roots = self.commands.iter().filter(|c| c.root);
        match (roots.next(), roots.next()) {
            (Some(root), None) => Some(root),
            _ => None,
        }
    }

    pub fn command(&self, id: &str) -> Option<&CommandDefinition> {
        self.commands.iter().find(|c| c.id == id)
    }

    /// Name and version for help headers.
    pub fn app_info(&self) -> AppInfo {
        AppInfo::new(self.title.clone(), self.version.clone())
    }

    /// Describes an existing tree.
    ///
    /// The injected `help` option is omitted. Actions are not part of a
    /// definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateCommand`] if two commands of the
    /// tree share a name, since definitions key commands by name.
    pub fn from_command(root: &Command, info: &AppInfo) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut commands = Vec::new();
        for command in root.commands() {
            if !seen.insert(command.name()) {
                return Err(DefinitionError::DuplicateCommand(command.name().to_string()).into());
            }
            commands.push(CommandDefinition {
                id: command.name().to_string(),
                description: command.description().to_string(),
                root: command.parent().is_none(),
                require_subcommand: command.require_subcommand(),
                options: command
                    .options()
                    .values()
                    .filter(|option| **option != CommandOption::help())
                    .map(OptionDefinition::from_option)
                    .collect(),
                subcommands: command.children().keys().map(str::to_string).collect(),
            });
        }
        Ok(Self {
            title: info.title.clone(),
            version: info.version.clone(),
            view: ViewSettings::default(),
            commands,
        })
    }
}

impl OptionDefinition {
    fn from_option(option: &CommandOption) -> Self {
        Self {
            id: option.id().to_string(),
            shortcut: option.shortcut().map(str::to_string),
            description: Some(option.description())
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            group: option.group().map(str::to_string),
            selected: option.selected(),
            parameters: option
                .parameters()
                .values()
                .map(|p| ParameterDefinition {
                    id: p.id().to_string(),
                    required: p.required(),
                    min_length: Some(p.min_length()).filter(|&min| min > 0),
                    max_length: Some(p.max_length()).filter(|&max| max < usize::MAX),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
title: Auth 2 API - CLI
version: "1.0"
view:
  print_line_number: true
commands:
  - id: auth2
    root: true
    description: Execute Auth 2 API CLI Application
    options:
      - id: development
        shortcut: d
        group: environment
        selected: true
      - id: production
        shortcut: p
        group: environment
    subcommands: [login]
  - id: login
    description: User login command for system
    options:
      - id: credentials
        shortcut: c
        description: Your username credentials path
        parameters:
          - id: path
            min_length: 1
            max_length: 10
          - id: profile
            required: false
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let definition = Definition::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(definition.title, "Auth 2 API - CLI");
        assert_eq!(definition.version, "1.0");
        assert!(definition.view.print_line_number);
        assert!(!definition.view.debug);
        assert_eq!(definition.commands.len(), 2);

        let login = definition.command("login").unwrap();
        assert!(!login.root);
        let path = &login.options[0].parameters[0];
        assert!(path.required);
        assert_eq!(path.min_length, Some(1));
        assert_eq!(path.max_length, Some(10));
        assert!(!login.options[0].parameters[1].required);
    }

    #[test]
    fn test_deserialize_minimal() {
        let definition = Definition::from_json_str(
            r#"{"title": "t", "commands": [{"id": "app", "root": true}]}"#,
        )
        .unwrap();
        assert_eq!(definition.version, "");
        assert_eq!(definition.view, ViewSettings::default());
        assert!(definition.commands[0].options.is_empty());
    }

    #[test]
    fn test_root_requires_exactly_one() {
        let mut definition = Definition::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(definition.root().unwrap().id, "auth2");

        definition.commands[1].root = true;
        assert!(definition.root().is_none());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("app.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("app.JSON")), Format::Json);
        assert_eq!(Format::from_path(Path::new("app.yml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("app")), Format::Yaml);
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let original = Definition::from_yaml_str(sample_yaml()).unwrap();

        for name in ["app.yml", "app.json"] {
            let path = dir.path().join(name);
            original.save(&path).unwrap();
            assert_eq!(Definition::load(&path).unwrap(), original);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = Definition::load("/nonexistent/app.yml").unwrap_err();
        assert!(matches!(err, crate::DataError::IoError(_)));
    }
}
