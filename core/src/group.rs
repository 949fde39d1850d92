//! Mutually-exclusive option groups.

use serde::Serialize;

use crate::error::{BuildError, Result};
use crate::ident;

/// A set of sibling options of which at most one is selected after
/// resolution.
///
/// Options join a group through [`OptionBuilder::group`](crate::OptionBuilder::group),
/// which records only the group id. Membership is collected when the options
/// are attached to a command, so every command owns its own registry of
/// groups and a group never owns its members.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Command, CommandOption, Group};
///
/// let env = Group::builder().id("env").build().unwrap();
/// let command = Command::builder()
///     .id("deploy")
///     .option(CommandOption::builder().id("dev", None).group(&env).selected(true).build().unwrap())
///     .option(CommandOption::builder().id("prod", None).group(&env).build().unwrap())
///     .build()
///     .unwrap();
///
/// let group = command.groups().get("env").unwrap();
/// assert_eq!(group.members(), ["dev", "prod"]);
/// assert_eq!(group.default_member(), Some("dev"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    id: String,
    members: Vec<String>,
    default: Option<String>,
}

impl Group {
    /// Returns a new [`GroupBuilder`].
    pub fn builder() -> GroupBuilder {
        GroupBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Member option ids in declaration order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// The option selected when no member is chosen explicitly.
    pub fn default_member(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Returns `true` if `option` belongs to this group.
    pub fn has_member(&self, option: &str) -> bool {
        self.members.iter().any(|member| member == option)
    }

    pub(crate) fn add_member(&mut self, option: &str, is_default: bool) -> Result<()> {
        if is_default {
            if let Some(existing) = &self.default {
                return Err(BuildError::ConflictingGroupDefault {
                    group: self.id.clone(),
                    existing: existing.clone(),
                    option: option.to_string(),
                });
            }
            self.default = Some(option.to_string());
        }
        self.members.push(option.to_string());
        Ok(())
    }
}

/// Builder for [`Group`].
#[derive(Debug, Clone, Default)]
pub struct GroupBuilder {
    id: Option<String>,
    error: Option<BuildError>,
}

impl GroupBuilder {
    /// Sets the group id.
    pub fn id(mut self, id: &str) -> Self {
        if self.error.is_none() {
            match ident::group_id(id) {
                Ok(id) => self.id = Some(id),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    /// Builds a group with no members.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidIdentifier`] if the id is missing or
    /// invalid.
    pub fn build(self) -> Result<Group> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let id = self.id.ok_or_else(|| BuildError::InvalidIdentifier {
            value: String::new(),
            reason: "group id is required".to_string(),
        })?;
        Ok(Group {
            id,
            members: Vec::new(),
            default: None,
        })
    }
}
