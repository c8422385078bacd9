use std::collections::HashSet;
use std::path::PathBuf;

use repack_builder::BuildRequest;
use repack_core::{aggregate_version, RunContext, UpdateError};

use crate::archive;
use crate::host::{BuildHost, FailureContext, ProgressSink, RecoveryChoice};
use crate::rollback::{run_rollback, RollbackReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub skip_build_verification: bool,
}

#[derive(Debug)]
pub enum RunOutcome {
    NothingToDo,
    Completed(RunReport),
    RolledBack(RollbackReport),
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub updated: usize,
    pub archive_file: Option<PathBuf>,
    pub build_failures: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn run_update<H, P, F>(
    context: &mut RunContext,
    host: &mut H,
    progress: &mut P,
    choose: &mut F,
    options: &RunOptions,
) -> Result<RunOutcome, UpdateError>
where
    H: BuildHost,
    P: ProgressSink,
    F: FnMut(&FailureContext<'_>) -> RecoveryChoice,
{
    if context.projects.is_empty() {
        return Err(UpdateError::NoProjects);
    }
    if context.any_project_in_local_mode() {
        return Err(UpdateError::LocalReferenceMode);
    }
    if !options.skip_build_verification {
        progress.status("verifying the workspace builds");
        if !host.build_solution() {
            return Err(UpdateError::PreflightBuildFailed);
        }
    }

    let targets = update_targets(context);
    if targets.is_empty() {
        return Ok(RunOutcome::NothingToDo);
    }

    progress.status("cleaning the workspace");
    host.clean_solution();

    let mut report = RunReport::default();
    progress.begin_stage("update", targets.len());
    let mut index = 0;
    while index < targets.len() {
        progress.advance(index);
        let package_index = targets[index];
        let id = context.packages[package_index].id().to_string();
        progress.status(&format!("updating {id}"));

        match update_package(context, package_index, host) {
            Ok(()) => index += 1,
            Err(error) => {
                let choice = choose(&FailureContext {
                    package_id: &id,
                    error: &error,
                    completed: context.updated_so_far.len(),
                    during_rollback: false,
                });
                match choice {
                    RecoveryChoice::Abort => {
                        let rollback = run_rollback(context, host, progress, choose)?;
                        return Ok(RunOutcome::RolledBack(rollback));
                    }
                    RecoveryChoice::Retry => {}
                    RecoveryChoice::Ignore => index += 1,
                }
            }
        }
    }
    progress.advance(targets.len());

    if context.archive_session.is_dir() {
        progress.status("archiving superseded artifacts");
        match archive::finalize_session(&context.archive_session) {
            Ok(zip_path) => report.archive_file = Some(zip_path),
            Err(error) => report
                .warnings
                .push(format!("failed to archive superseded artifacts: {error}")),
        }
    }

    progress.status("building remaining projects");
    build_remaining_projects(context, host, progress, &mut report);

    progress.status("reopening the workspace");
    host.reopen_solution();

    report.updated = context.updated_so_far.len();
    Ok(RunOutcome::Completed(report))
}

fn update_targets(context: &RunContext) -> Vec<usize> {
    let mut targets: Vec<usize> = (0..context.packages.len())
        .filter(|&index| context.packages[index].project.is_some())
        .collect();

    let with_projects: HashSet<&str> = targets
        .iter()
        .map(|&index| context.packages[index].id())
        .collect();
    for (index, package) in context.packages.iter().enumerate() {
        if package.project.is_some() {
            continue;
        }
        if package
            .manifest
            .dependency_ids()
            .any(|id| with_projects.contains(id))
        {
            targets.push(index);
        }
    }
    targets
}

fn update_package<H: BuildHost>(
    context: &mut RunContext,
    package_index: usize,
    host: &mut H,
) -> Result<(), UpdateError> {
    let project_index = context.packages[package_index].project;

    let (build_output, assembly_version) = match project_index {
        Some(project_index) => {
            let name = context.projects[project_index].name.clone();
            if !host.build_project(&context.projects[project_index]) {
                return Err(UpdateError::BuildFailure { project: name });
            }
            let project = &mut context.projects[project_index];
            project.built = true;
            (Some(project.output_dir.clone()), Some(project.version.clone()))
        }
        None => (None, None),
    };

    let updated = context.updated_versions();
    let package = &context.packages[package_index];
    let Some(repository) = package.repository.clone() else {
        return Err(UpdateError::MissingRepository {
            id: package.id().to_string(),
        });
    };
    let old_artifact = repository.join(package.artifact_file_name());

    if project_index.is_none() {
        let aggregate = aggregate_version(
            package.version(),
            package
                .manifest
                .dependency_ids()
                .filter_map(|id| updated.get(id)),
            context.pre_release,
        );
        if aggregate <= *package.version() {
            return Ok(());
        }
    }

    let manifest = package.manifest.clone();
    let built = repack_builder::build_artifact(&BuildRequest {
        manifest: &manifest,
        old_artifact: &old_artifact,
        build_output: build_output.as_deref(),
        assembly_version: assembly_version.as_ref(),
        destination: &repository,
        updated_dependencies: &updated,
        pre_release: context.pre_release,
    })?;

    let record = &mut context.packages[package_index];
    record.new_artifact_name = Some(built.file_name);
    record.new_version = Some(built.version);

    archive::archive_current(&context.packages[package_index], &context.archive_session)?;
    context.updated_so_far.push(package_index);
    Ok(())
}

fn build_remaining_projects<H: BuildHost, P: ProgressSink>(
    context: &mut RunContext,
    host: &mut H,
    progress: &mut P,
    report: &mut RunReport,
) {
    progress.begin_stage("build", context.projects.len());
    for index in 0..context.projects.len() {
        progress.advance(index);
        if context.projects[index].built {
            continue;
        }
        if host.build_project(&context.projects[index]) {
            context.projects[index].built = true;
        } else {
            report
                .build_failures
                .push(context.projects[index].name.clone());
        }
    }
    progress.advance(context.projects.len());
}
