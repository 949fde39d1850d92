//! Plain-text help pages.

use crate::command::Command;
use crate::option::CommandOption;
use crate::view::AppInfo;

const DESCRIPTION_WIDTH: usize = 30;

/// Renders the help page of `command` as lines.
///
/// The page shows the application header, a usage line built from the
/// command path, the command description, an options table ordered by group
/// then id, and, when the command has children, a subcommand listing ordered
/// by name.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{AppInfo, Command, render_help};
///
/// let root = Command::builder()
///     .id("auth2")
///     .description("Auth 2 API")
///     .sub_command(Command::builder().id("login").description("User login").build().unwrap())
///     .build()
///     .unwrap();
///
/// let lines = render_help(&root, &AppInfo::new("Auth 2 API - CLI", "1.0"));
/// assert_eq!(lines[1], "Auth 2 API - CLI. Version: 1.0");
/// assert_eq!(lines[3], "Usage: auth2 [options] [subcommands]");
/// assert!(lines.iter().any(|line| line.trim_start().starts_with("login")));
/// ```
pub fn render_help(command: &Command, info: &AppInfo) -> Vec<String> {
    let mut lines = vec![String::new(), header(info), String::new()];

    let suffix = if command.has_children() {
        " [subcommands]"
    } else {
        ""
    };
    lines.push(format!(
        "Usage: {} [options]{suffix}",
        command.id().replace('.', " ")
    ));
    lines.push(String::new());
    if !command.description().is_empty() {
        lines.push(command.description().to_string());
        lines.push(String::new());
    }

    lines.push("[options]:".to_string());
    lines.push(String::new());
    lines.push(format!(
        "{:3}{:<22}{:<11}{:<35}{}",
        "", "Option", "Group", "Description", "Parameters"
    ));
    lines.push(String::new());

    let mut options: Vec<&CommandOption> = command.options().values().collect();
    options.sort_by(|a, b| (a.group(), a.id()).cmp(&(b.group(), b.id())));
    for option in options {
        option_lines(option, &mut lines);
    }
    lines.push(String::new());

    if command.has_children() {
        lines.push("[subcommands]:".to_string());
        lines.push(String::new());
        let mut children: Vec<&Command> = command.children().values().collect();
        children.sort_by(|a, b| a.name().cmp(b.name()));
        for child in children {
            lines.push(format!("{:3}{:<39}{}", "", child.name(), child.description()));
        }
        lines.push(String::new());
    }

    lines
}

fn header(info: &AppInfo) -> String {
    if info.version.is_empty() {
        info.title.clone()
    } else {
        format!("{}. Version: {}", info.title, info.version)
    }
}

fn option_lines(option: &CommandOption, lines: &mut Vec<String>) {
    let label = match option.shortcut() {
        Some(shortcut) => format!("-{shortcut}, --{}", option.id()),
        None => format!("    --{}", option.id()),
    };
    let chunks = description_chunks(option.description());
    let first = chunks.first().map(String::as_str).unwrap_or_default();

    lines.push(format!(
        "{:3}{label:<22}{:<11}{first:<35}{}",
        "",
        option.group().unwrap_or_default(),
        parameter_summary(option)
    ));
    for chunk in chunks.iter().skip(1) {
        lines.push(format!("{:36}{chunk}", ""));
    }
}

/// `[0:<a:R>, 1:<b:O>]: 2` for required `a` and optional `b`.
pub(crate) fn parameter_summary(option: &CommandOption) -> String {
    let parameters = option.parameters();
    if parameters.is_empty() {
        return String::new();
    }
    let slots: Vec<String> = parameters
        .values()
        .enumerate()
        .map(|(index, parameter)| {
            let kind = if parameter.required() { "R" } else { "O" };
            format!("{index}:<{}:{kind}>", parameter.id())
        })
        .collect();
    format!("[{}]: {}", slots.join(", "), parameters.len())
}

fn description_chunks(description: &str) -> Vec<String> {
    let chars: Vec<char> = description.chars().collect();
    chars
        .chunks(DESCRIPTION_WIDTH)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Group, Parameter};

    fn info() -> AppInfo {
        AppInfo::new("Auth 2 API - CLI", "1.0")
    }

    fn credential() -> Command {
        let format = Group::builder().id("format").build().unwrap();
        let test = Command::builder()
            .id("test")
            .description("Test credentials")
            .build()
            .unwrap();
        Command::builder()
            .id("credential")
            .description("Credential options")
            .option(
                CommandOption::builder()
                    .id("json", Some("j"))
                    .description("Print the credential as JSON")
                    .group(&format)
                    .build()
                    .unwrap(),
            )
            .option(
                CommandOption::builder()
                    .id("path", Some("p"))
                    .description("Credential file path that will be used by every subcommand")
                    .parameter(Parameter::builder().id("file").range(1, 40).order(0).build().unwrap())
                    .parameter(
                        Parameter::builder()
                            .id("profile")
                            .range(1, 10)
                            .order(1)
                            .required(false)
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            )
            .sub_command(test)
            .build()
            .unwrap()
    }

    #[test]
    fn test_header_and_usage() {
        let root = Command::builder()
            .id("auth2")
            .sub_command(credential())
            .build()
            .unwrap();
        let nested = root.child("credential").unwrap().child("test").unwrap();
        let lines = render_help(nested, &info());

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Auth 2 API - CLI. Version: 1.0");
        assert_eq!(lines[3], "Usage: auth2 credential test [options]");
        assert_eq!(lines[5], "Test credentials");
        assert!(!lines.contains(&"[subcommands]:".to_string()));
    }

    #[test]
    fn test_options_ordered_by_group_then_id() {
        let lines = render_help(&credential(), &info());
        let rows: Vec<&String> = lines
            .iter()
            .filter(|line| line.trim_start().starts_with('-'))
            .collect();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("--help"));
        assert!(rows[1].contains("--path"));
        assert!(rows[2].contains("--json"));
        assert!(rows[2].contains("format"));
    }

    #[test]
    fn test_parameter_summary() {
        let command = credential();
        let path = command.option("path").unwrap();
        assert_eq!(parameter_summary(path), "[0:<file:R>, 1:<profile:O>]: 2");
        assert_eq!(parameter_summary(command.option("help").unwrap()), "");
    }

    #[test]
    fn test_long_description_wraps() {
        let lines = render_help(&credential(), &info());
        let row = lines.iter().position(|line| line.contains("--path")).unwrap();

        assert!(lines[row].contains("Credential file path that will"));
        assert_eq!(lines[row + 1].trim(), "be used by every subcommand");
    }

    #[test]
    fn test_subcommands_listed() {
        let lines = render_help(&credential(), &info());
        let start = lines.iter().position(|line| line == "[subcommands]:").unwrap();
        assert!(lines[start + 2].contains("test"));
        assert!(lines[start + 2].ends_with("Test credentials"));
    }
}
