//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{sample_roster, Allocation};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::{output, report};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{FairInterleaver, NonLargestPick};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Allocate {
            roster,
            tree,
            hide_empty,
        }) => cmd_allocate(cli, roster.as_deref(), *tree, *hide_empty),
        Some(Commands::Demo { tree }) => cmd_demo(cli, *tree),
        Some(Commands::Interleave { items }) => cmd_interleave(cli, items),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see `giftcircle --help`".to_string(),
        )),
    }
}

/// Settings from config layers, with command-line flags on top.
fn load_settings(cli: &Cli, local_dir: Option<&Path>) -> CliResult<Settings> {
    let mut settings = Settings::load(local_dir)?;
    if let Some(pick) = cli.pick {
        settings.pick = pick.into();
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

#[instrument(skip(cli))]
fn cmd_allocate(cli: &Cli, roster: Option<&Path>, tree: bool, hide_empty: bool) -> CliResult<()> {
    let local_dir = roster.and_then(Path::parent);
    let settings = load_settings(cli, local_dir)?;

    let roster: PathBuf = match roster {
        Some(path) => path.to_path_buf(),
        None => settings.roster.clone().ok_or_else(|| {
            CliError::Usage("no roster given and none configured".to_string())
        })?,
    };
    let tree = tree || settings.output.tree;
    let show_empty = !hide_empty && settings.output.show_empty;

    let container = ServiceContainer::new(settings);
    let participants = container.roster_service().load(&roster)?;
    let allocation = container.allocation_service().allocate(participants);

    print_allocation(&allocation, tree, show_empty);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_demo(cli: &Cli, tree: bool) -> CliResult<()> {
    let settings = load_settings(cli, None)?;
    let tree = tree || settings.output.tree;
    let show_empty = settings.output.show_empty;

    let container = ServiceContainer::new(settings);
    let allocation = container.allocation_service().allocate(sample_roster());

    print_allocation(&allocation, tree, show_empty);
    Ok(())
}

fn print_allocation(allocation: &Allocation, tree: bool, show_empty: bool) {
    if tree {
        output::info(&report::tree(allocation, show_empty));
    } else {
        for section in report::sections(allocation, show_empty) {
            output::header(&format!("--{}--", section.title));
            for line in &section.lines {
                output::info(line);
            }
        }
    }

    output::header("--Summary--");
    for line in report::summary(allocation) {
        output::detail(&line);
    }
    for participant in allocation.rejects() {
        output::flagged(participant);
    }
    for participant in allocation.unmatched() {
        output::warning(&format!("no circle for {participant}"));
    }
}

#[instrument(skip(cli))]
fn cmd_interleave(cli: &Cli, items: &str) -> CliResult<()> {
    if items.is_empty() {
        return Err(CliError::InvalidArgs("nothing to interleave".to_string()));
    }
    let pick = cli.pick.map(NonLargestPick::from).unwrap_or_default();

    let result = FairInterleaver::new(items.chars(), |c: &char| *c)
        .with_pick(pick)
        .compute();

    output::info(&format!("rejects: [{}]", result.rejects.iter().join(", ")));
    output::info(&format!("sorted:  [{}]", result.sorted.iter().join(", ")));
    if result.forced_repeats > 0 {
        output::warning(&format!(
            "{} adjacent repeats could not be avoided",
            result.forced_repeats
        ));
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli, None)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::warning("no config directory for this platform"),
            }
            output::detail(&format!(
                "local:  {}",
                local_config_path(Path::new("<roster_dir>")).display()
            ));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("no config directory for this platform".to_string())
            })?;
            init_config(&RealFileSystem, &path, *force)?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(())
}

/// Write the config template to `path`.
fn init_config(fs: &dyn FileSystem, path: &Path, force: bool) -> CliResult<()> {
    if fs.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "{} exists, use --force to overwrite",
            path.display()
        )));
    }
    fs.ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
    fs.write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    eprintln!("Generating completion file for {shell:?}...");
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_missing_config_when_init_then_writes_template() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/giftcircle.toml");

        init_config(&RealFileSystem, &path, false).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), Settings::template());
    }

    #[test]
    fn given_existing_config_when_init_without_force_then_usage_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("giftcircle.toml");
        std::fs::write(&path, "pick = \"first-available\"\n").unwrap();

        let err = init_config(&RealFileSystem, &path, false).unwrap_err();

        assert!(matches!(err, CliError::Usage(_)));
        assert!(init_config(&RealFileSystem, &path, true).is_ok());
    }

    #[test]
    fn given_no_command_when_executing_then_usage_error() {
        let cli = Cli {
            debug: 0,
            pick: None,
            command: None,
        };

        let err = execute_command(&cli).unwrap_err();

        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
    }
}
