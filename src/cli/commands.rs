//! Command dispatch

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::BuiltHierarchy;
use crate::cli::args::{BuildFlags, Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::render::{node_label, node_row};
use crate::domain::validate::Severity;
use crate::domain::{expand_env_vars, BuildOptions, ToTermTree};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Build {
            file,
            flags,
            format,
            output,
        }) => cmd_build(cli, file, *flags, *format, output.as_deref()),
        Some(Commands::Check { file, flags }) => cmd_check(cli, file, *flags),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show { dir } => cmd_config_show(cli, dir.as_deref()),
            ConfigCommands::Path => cmd_config_path(),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see 'hierfix --help'".to_string(),
        )),
    }
}

/// Expand `~` and variables in a user supplied path.
fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(expand_env_vars(&path.to_string_lossy()))
}

fn load_settings(cli: &Cli, input_dir: Option<&Path>) -> CliResult<Settings> {
    let settings = match &cli.config {
        Some(path) => Settings::load_file(&expand_path(path))?,
        None => Settings::load(input_dir)?,
    };
    Ok(settings)
}

fn container_for(cli: &Cli, input: &Path) -> CliResult<ServiceContainer> {
    let input_dir = input.parent().filter(|p| !p.as_os_str().is_empty());
    Ok(ServiceContainer::new(load_settings(cli, input_dir)?))
}

/// Flags switch features on; settings supply the defaults.
fn resolve_options(settings: &Settings, flags: BuildFlags) -> BuildOptions {
    let defaults = settings.build_options();
    BuildOptions {
        fix_breadth_gaps: defaults.fix_breadth_gaps || flags.breadth,
        use_subtree: defaults.use_subtree || flags.subtree,
        max_breadth_gap: flags.max_gap.or(defaults.max_breadth_gap),
    }
}

fn render(built: &BuiltHierarchy, format: OutputFormat) -> String {
    match format {
        OutputFormat::Tree => built.arena.to_term_tree().to_string(),
        OutputFormat::List => {
            let mut out = String::new();
            for &idx in &built.nodes {
                if let Some(node) = built.arena.get_node(idx) {
                    out.push_str(&node_row(node));
                    out.push('\n');
                }
            }
            out
        }
    }
}

#[instrument(skip(cli))]
fn cmd_build(
    cli: &Cli,
    file: &Path,
    flags: BuildFlags,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> CliResult<()> {
    let file = expand_path(file);
    let container = container_for(cli, &file)?;
    let options = resolve_options(&container.settings, flags);
    debug!("cmd_build: options={:?}", options);

    let built = container.hierarchy.build(&file, options)?;
    let rendered = render(&built, format);

    match output_path {
        Some(path) => {
            let path = expand_path(path);
            container.hierarchy.write_output(&path, &rendered)?;
            output::success(&format!(
                "Wrote {} nodes ({} artificial) to {}",
                built.nodes.len(),
                built.artificial_count(),
                path.display()
            ));
        }
        None => {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", rendered)
                .and_then(|_| stdout.flush())
                .map_err(InfraError::Stdout)?;
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_check(cli: &Cli, file: &Path, flags: BuildFlags) -> CliResult<()> {
    let file = expand_path(file);
    let container = container_for(cli, &file)?;
    let options = resolve_options(&container.settings, flags);

    let built = container.hierarchy.build(&file, options)?;
    let report = built.validate();

    output::header(&format!(
        "{}: {} nodes, {} artificial, {} levels, {} leaves",
        file.display(),
        report.nodes_checked,
        built.artificial_count(),
        built.arena.depth(),
        built.arena.leaf_ids().len()
    ));
    for issue in &report.issues {
        let subject = issue
            .node
            .and_then(|idx| built.arena.get_node(idx))
            .map(node_label)
            .unwrap_or_default();
        match issue.severity {
            Severity::Error => output::error(&format!("{} {}", issue.message, subject)),
            Severity::Warning => output::warning(&issue.message),
        }
    }

    if report.is_healthy() {
        output::success("hierarchy is complete");
        Ok(())
    } else {
        Err(CliError::Unhealthy(report.issues.len()))
    }
}

fn cmd_config_show(cli: &Cli, dir: Option<&Path>) -> CliResult<()> {
    let dir = dir.map(expand_path);
    let settings = load_settings(cli, dir.as_deref())?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    output::header("Config files (lowest to highest precedence):");
    match global_config_path() {
        Some(path) => output::detail(&format!("global: {}", path.display())),
        None => output::detail("global: <no config directory>"),
    }
    output::detail(&format!(
        "local:  {}",
        local_config_path(Path::new("<input dir>")).display()
    ));
    output::detail("env:    HIERFIX_<SECTION>__<KEY>");
    Ok(())
}
