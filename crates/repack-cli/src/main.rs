mod config;
mod host;
mod render;
mod workspace;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use repack_core::RunContext;
use repack_engine::{
    load_run_context, run_update, FailureContext, RecoveryChoice, RunOptions, RunOutcome,
};

use crate::config::WorkspaceConfig;
use crate::host::CommandHost;
use crate::render::TerminalProgress;

#[derive(Parser, Debug)]
#[command(name = "repack")]
#[command(about = "Dependency-ordered package republishing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Update {
        #[arg(long)]
        pre_release: bool,
        #[arg(long)]
        skip_build_verification: bool,
        #[arg(long, value_enum)]
        on_error: Option<OnError>,
        #[arg(long, default_value = "repack.toml")]
        config: PathBuf,
    },
    Order {
        #[arg(long, default_value = "repack.toml")]
        config: PathBuf,
    },
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnError {
    Abort,
    Retry,
    Ignore,
}

impl From<OnError> for RecoveryChoice {
    fn from(choice: OnError) -> Self {
        match choice {
            OnError::Abort => RecoveryChoice::Abort,
            OnError::Retry => RecoveryChoice::Retry,
            OnError::Ignore => RecoveryChoice::Ignore,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Update {
            pre_release,
            skip_build_verification,
            on_error,
            config,
        } => run_update_command(&config, pre_release, skip_build_verification, on_error),
        Commands::Order { config } => run_order_command(&config),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "repack", &mut io::stdout());
            Ok(())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_context(config_path: &Path, pre_release: bool) -> Result<(RunContext, WorkspaceConfig)> {
    let config = WorkspaceConfig::load(config_path)?;
    let root = config_path.parent().unwrap_or_else(|| Path::new("."));
    let projects = workspace::discover_projects(root)?;
    let context = load_run_context(
        &config.package_sources,
        &config.archive_root,
        pre_release,
        projects,
    )
    .context("failed to prepare the update run")?;
    Ok((context, config))
}

fn run_update_command(
    config_path: &Path,
    pre_release: bool,
    skip_build_verification: bool,
    on_error: Option<OnError>,
) -> Result<()> {
    let (mut context, config) = load_context(config_path, pre_release)?;
    for warning in &context.warnings {
        render::print_warning(warning);
    }

    let mut host = CommandHost::new(config.build);
    let mut progress = TerminalProgress::new();
    let mut choose = recovery_chooser(on_error);
    let outcome = run_update(
        &mut context,
        &mut host,
        &mut progress,
        &mut choose,
        &RunOptions {
            skip_build_verification,
        },
    )?;
    drop(progress);

    match outcome {
        RunOutcome::NothingToDo => {
            println!("no package has a project or an affected dependent; nothing to update");
        }
        RunOutcome::Completed(report) => {
            for warning in &report.warnings {
                render::print_warning(warning);
            }
            println!("updated {} package(s)", report.updated);
            if let Some(archive) = &report.archive_file {
                println!("superseded artifacts archived to {}", archive.display());
            }
            if !report.build_failures.is_empty() {
                for project in &report.build_failures {
                    render::print_error(&format!("project {project} failed to build"));
                }
                bail!(
                    "{} project(s) failed to build after the update",
                    report.build_failures.len()
                );
            }
        }
        RunOutcome::RolledBack(report) => {
            for warning in &report.warnings {
                render::print_warning(warning);
            }
            if report.aborted || report.partial {
                bail!(
                    "update aborted; only {} package(s) were restored, the repositories need manual attention",
                    report.recovered
                );
            }
            println!(
                "update aborted; all {} completed package(s) were restored",
                report.recovered
            );
        }
    }
    Ok(())
}

fn run_order_command(config_path: &Path) -> Result<()> {
    let (context, _) = load_context(config_path, false)?;
    for warning in &context.warnings {
        render::print_warning(warning);
    }
    for package in &context.packages {
        let marker = if package.project.is_some() { "*" } else { " " };
        let location = package
            .repository
            .as_ref()
            .map(|repository| repository.display().to_string())
            .unwrap_or_else(|| "(not found in any source)".to_string());
        println!("{marker} {} {}  {}", package.id(), package.version(), location);
    }
    Ok(())
}

fn recovery_chooser(
    on_error: Option<OnError>,
) -> Box<dyn FnMut(&FailureContext<'_>) -> RecoveryChoice> {
    let Some(choice) = on_error else {
        return Box::new(render::prompt_recovery);
    };
    let choice = RecoveryChoice::from(choice);
    let mut last_failed = String::new();
    Box::new(move |failure: &FailureContext<'_>| {
        render::print_error(&format!("{} failed: {}", failure.package_id, failure.error));
        if choice == RecoveryChoice::Retry {
            if last_failed == failure.package_id {
                return RecoveryChoice::Abort;
            }
            last_failed = failure.package_id.to_string();
        }
        choice
    })
}
