//! Structural validation of definitions.
//!
//! Catches problems the core builders cannot see because they only exist in
//! the flat, reference-based file layout: missing or duplicate roots,
//! duplicate command ids, dangling subcommand references, commands with two
//! parents, cycles, and commands unreachable from the root.
//!
//! Identifier syntax, parameter order and group defaults are left to the
//! builders during conversion.
//!
//! # Examples
//!
//! ```
//! use cmdtree_data::{Definition, DefinitionError, validate_definition};
//!
//! let definition = Definition::from_yaml_str(r#"
//! title: app
//! commands:
//!   - { id: app, root: true, subcommands: [run] }
//!   - { id: run, subcommands: [app] }
//! "#).unwrap();
//!
//! let errors = validate_definition(&definition);
//! assert!(errors.iter().any(|e| matches!(e, DefinitionError::SubcommandCycle(_))));
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::definition::{CommandDefinition, Definition};

/// Definition validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The definition lists no commands at all.
    #[error("definition has no commands")]
    NoCommands,
    /// No command is marked as root.
    #[error("no command is marked as root")]
    MissingRoot,
    /// More than one command is marked as root.
    #[error("multiple root commands: {0}")]
    MultipleRoots(String),
    /// Two commands share an id.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
    /// A command lists the same subcommand twice.
    #[error("command '{command}' lists subcommand '{subcommand}' twice")]
    DuplicateSubcommand { command: String, subcommand: String },
    /// A subcommand reference names no command.
    #[error("command '{command}' references unknown subcommand '{subcommand}'")]
    UnknownSubcommand { command: String, subcommand: String },
    /// A command is listed as subcommand by more than one parent.
    #[error("command '{command}' has more than one parent: {parents}")]
    MultipleParents { command: String, parents: String },
    /// A subcommand path leads back to one of its own ancestors.
    #[error("subcommand cycle detected at path: {0}")]
    SubcommandCycle(String),
    /// A command cannot be reached from the root.
    #[error("command '{0}' is not reachable from the root")]
    Unreachable(String),
}

/// Validates a definition, returning every problem found in a fixed order:
/// ids and roots first, then references, then the shape of the tree.
///
/// Later checks are skipped once an earlier stage fails, so the first error
/// is always the most fundamental one.
pub fn validate_definition(definition: &Definition) -> Vec<DefinitionError> {
    let mut errors = Vec::new();

    if definition.commands.is_empty() {
        errors.push(DefinitionError::NoCommands);
        return errors;
    }

    let mut by_id: HashMap<&str, &CommandDefinition> = HashMap::new();
    for command in &definition.commands {
        if by_id.insert(command.id.as_str(), command).is_some() {
            errors.push(DefinitionError::DuplicateCommand(command.id.clone()));
        }
    }

    let roots: Vec<&str> = definition
        .commands
        .iter()
        .filter(|c| c.root)
        .map(|c| c.id.as_str())
        .collect();
    match roots.as_slice() {
        [] => errors.push(DefinitionError::MissingRoot),
        [_] => {}
        many => errors.push(DefinitionError::MultipleRoots(many.join(", "))),
    }
    if !errors.is_empty() {
        return errors;
    }

    errors.extend(validate_references(definition, &by_id));
    if !errors.is_empty() {
        return errors;
    }

    let root = by_id[roots[0]];
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    errors.extend(validate_subcommands(root, &by_id, &mut path, &mut visited));
    if !errors.is_empty() {
        return errors;
    }

    for command in &definition.commands {
        if !visited.contains(command.id.as_str()) {
            errors.push(DefinitionError::Unreachable(command.id.clone()));
        }
    }

    errors
}

fn validate_references(
    definition: &Definition,
    by_id: &HashMap<&str, &CommandDefinition>,
) -> Vec<DefinitionError> {
    let mut errors = Vec::new();
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();

    for command in &definition.commands {
        let mut seen = HashSet::new();
        for sub in &command.subcommands {
            if !seen.insert(sub.as_str()) {
                errors.push(DefinitionError::DuplicateSubcommand {
                    command: command.id.clone(),
                    subcommand: sub.clone(),
                });
                continue;
            }
            if !by_id.contains_key(sub.as_str()) {
                errors.push(DefinitionError::UnknownSubcommand {
                    command: command.id.clone(),
                    subcommand: sub.clone(),
                });
                continue;
            }
            parents
                .entry(sub.as_str())
                .or_default()
                .push(command.id.as_str());
        }
    }

    // Report in declaration order for stable output.
    for command in &definition.commands {
        if let Some(list) = parents.get(command.id.as_str()) {
            if list.len() > 1 {
                errors.push(DefinitionError::MultipleParents {
                    command: command.id.clone(),
                    parents: list.join(", "),
                });
            }
        }
    }

    errors
}

fn validate_subcommands<'a>(
    command: &'a CommandDefinition,
    by_id: &HashMap<&str, &'a CommandDefinition>,
    path: &mut Vec<&'a str>,
    visited: &mut HashSet<&'a str>,
) -> Vec<DefinitionError> {
    let mut errors = Vec::new();
    path.push(command.id.as_str());
    visited.insert(command.id.as_str());

    for sub in &command.subcommands {
        let name = sub.as_str();
        if path.contains(&name) {
            let cycle_path = path
                .iter()
                .copied()
                .chain(std::iter::once(name))
                .collect::<Vec<_>>()
                .join(" ");
            errors.push(DefinitionError::SubcommandCycle(cycle_path));
            break;
        }
        if let Some(&child) = by_id.get(name) {
            errors.extend(validate_subcommands(child, by_id, path, visited));
            if !errors.is_empty() {
                break;
            }
        }
    }

    path.pop();
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(yaml: &str) -> Definition {
        Definition::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn test_accepts_valid_tree() {
        let definition = definition(
            r#"
title: app
commands:
  - { id: app, root: true, subcommands: [login, credential] }
  - { id: login }
  - { id: credential, subcommands: [test] }
  - { id: test }
"#,
        );
        assert!(validate_definition(&definition).is_empty());
    }

    #[test]
    fn test_rejects_empty() {
        let definition = definition("title: app\ncommands: []\n");
        assert_eq!(validate_definition(&definition), [DefinitionError::NoCommands]);
    }

    #[test]
    fn test_rejects_missing_and_multiple_roots() {
        let missing = definition("title: app\ncommands: [{ id: app }]\n");
        assert_eq!(validate_definition(&missing), [DefinitionError::MissingRoot]);

        let multiple = definition(
            "title: app\ncommands: [{ id: a, root: true }, { id: b, root: true }]\n",
        );
        assert_eq!(
            validate_definition(&multiple),
            [DefinitionError::MultipleRoots("a, b".to_string())]
        );
    }

    #[test]
    fn test_rejects_duplicate_command() {
        let definition = definition(
            "title: app\ncommands: [{ id: app, root: true }, { id: app }]\n",
        );
        assert_eq!(
            validate_definition(&definition),
            [DefinitionError::DuplicateCommand("app".to_string())]
        );
    }

    #[test]
    fn test_rejects_unknown_and_repeated_subcommand() {
        let definition = definition(
            r#"
title: app
commands:
  - { id: app, root: true, subcommands: [login, login, nope] }
  - { id: login }
"#,
        );
        assert_eq!(
            validate_definition(&definition),
            [
                DefinitionError::DuplicateSubcommand {
                    command: "app".to_string(),
                    subcommand: "login".to_string(),
                },
                DefinitionError::UnknownSubcommand {
                    command: "app".to_string(),
                    subcommand: "nope".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_rejects_shared_child() {
        let definition = definition(
            r#"
title: app
commands:
  - { id: app, root: true, subcommands: [a, b] }
  - { id: a, subcommands: [shared] }
  - { id: b, subcommands: [shared] }
  - { id: shared }
"#,
        );
        assert_eq!(
            validate_definition(&definition),
            [DefinitionError::MultipleParents {
                command: "shared".to_string(),
                parents: "a, b".to_string(),
            }]
        );
    }

    #[test]
    fn test_rejects_cycle() {
        let definition = definition(
            r#"
title: app
commands:
  - { id: app, root: true, subcommands: [remote] }
  - { id: remote, subcommands: [app] }
"#,
        );
        assert_eq!(
            validate_definition(&definition),
            [DefinitionError::SubcommandCycle("app remote app".to_string())]
        );
    }

    #[test]
    fn test_rejects_unreachable() {
        let definition = definition(
            r#"
title: app
commands:
  - { id: app, root: true }
  - { id: orphan }
  - { id: loop-a, subcommands: [loop-b] }
  - { id: loop-b, subcommands: [loop-a] }
"#,
        );
        assert_eq!(
            validate_definition(&definition),
            [
                DefinitionError::Unreachable("orphan".to_string()),
                DefinitionError::Unreachable("loop-a".to_string()),
                DefinitionError::Unreachable("loop-b".to_string()),
            ]
        );
    }
}
