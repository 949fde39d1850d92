use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use cmdtree_core::{ActionResult, Command as TreeCommand, ResolvedOptions, TextView, View};
use cmdtree_data::{ActionRegistry, Definition, build_tree, into_shell};
use tracing::{debug, info};

/// Output format for resolved options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "cmdtree")]
#[command(version, about = "Validate and exercise command tree definitions")]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. `debug`, `cmdtree_core=trace`).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one or more definition files.
    Validate(ValidateArgs),
    /// Print the help page of a command in a definition.
    Help(HelpArgs),
    /// Resolve arguments against a definition and print the selected options.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Definition files (YAML or JSON).
    #[arg(required = true)]
    definitions: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Definition file (YAML or JSON).
    definition: PathBuf,
    /// Subcommand names leading to the command, e.g. `credential test`.
    path: Vec<String>,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Definition file (YAML or JSON).
    definition: PathBuf,
    /// Output format for the resolved options.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
    /// Arguments to resolve, as an end user would type them.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.parse().unwrap_or_default()),
        )
        .init();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Help(args) => run_help(args),
        Command::Run(args) => run_run(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn run_validate(args: ValidateArgs) -> Result<i32, String> {
    let mut commands = 0;
    for path in &args.definitions {
        let definition = Definition::load(path).map_err(|e| format!("{}: {e}", path.display()))?;
        let tree = build_tree(&definition, &ActionRegistry::new())
            .map_err(|e| format!("{}: {e}", path.display()))?;
        debug!(path = %path.display(), root = tree.id(), "Definition is valid");
        commands += tree.commands().len();
    }
    println!(
        "Validated {} definition file(s) with {} command(s).",
        args.definitions.len(),
        commands
    );
    Ok(0)
}

fn run_help(args: HelpArgs) -> Result<i32, String> {
    let definition = Definition::load(&args.definition).map_err(|e| e.to_string())?;
    let tree = build_tree(&definition, &ActionRegistry::new()).map_err(|e| e.to_string())?;
    let command = find_by_names(&tree, &args.path)?;

    let mut view = definition.view.apply(TextView::stdio(definition.app_info()));
    view.print_help(command);
    Ok(0)
}

fn run_run(args: RunArgs) -> Result<i32, String> {
    let definition = Definition::load(&args.definition).map_err(|e| e.to_string())?;
    let tree = build_tree(&definition, &ActionRegistry::new()).map_err(|e| e.to_string())?;

    let format = args.format;
    let mut actions = ActionRegistry::new();
    for command in tree.commands() {
        actions.insert(
            command.id(),
            Arc::new(move |options: &ResolvedOptions, view: &mut dyn View| {
                print_options(options, view, format)
            }),
        );
    }
    let shell = into_shell(&definition, &actions).map_err(|e| e.to_string())?;

    info!(definition = %args.definition.display(), args = ?args.args, "Resolving arguments");
    let mut view = definition.view.apply(TextView::stdio(definition.app_info()));
    let status = shell.execute(args.args.as_slice(), &mut view);
    debug!(?status, "Execution finished");
    Ok(status.exit_code())
}

fn find_by_names<'a>(root: &'a TreeCommand, names: &[String]) -> Result<&'a TreeCommand, String> {
    let mut command = root;
    for name in names {
        command = command
            .child(name)
            .ok_or_else(|| format!("command '{}' has no subcommand '{name}'", command.id()))?;
    }
    Ok(command)
}

fn print_options(options: &ResolvedOptions, view: &mut dyn View, format: CliOutputFormat) -> ActionResult {
    let rendered = match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(options)?,
        CliOutputFormat::Yaml => serde_yaml::to_string(options)?,
        CliOutputFormat::Text => format_text(options),
    };
    for line in rendered.lines() {
        view.print(line);
    }
    Ok(())
}

fn format_text(options: &ResolvedOptions) -> String {
    let mut out = format!("command: {}", options.command());
    for option in options.selected() {
        out.push_str(&format!("\n--{}", option.id()));
        for parameter in option.parameters().values() {
            if let Some(data) = parameter.data() {
                out.push_str(&format!("\n  {} = {data}", parameter.id()));
            }
        }
    }
    out
}
