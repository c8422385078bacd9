use std::path::{Path, PathBuf};

use repack_core::{PackageRecord, ProjectRecord, RunContext, UpdateError};

pub fn load_run_context(
    sources: &[PathBuf],
    archive_root: &Path,
    pre_release: bool,
    projects: Vec<ProjectRecord>,
) -> Result<RunContext, UpdateError> {
    let manifests = repack_repository::aggregate_sources(sources)?;
    let records: Vec<PackageRecord> = manifests.into_iter().map(PackageRecord::new).collect();
    let ordered = repack_resolver::dependency_order(records)?;

    let session = archive_root.join(RunContext::session_label());
    let mut context = RunContext::new(pre_release, sources.to_vec(), session);
    context.packages = ordered;
    context.projects = projects;

    let mut warnings = Vec::new();
    for package in &mut context.packages {
        let file_name = package.artifact_file_name();
        if let Some(located) = repack_repository::locate_artifact(sources, &file_name) {
            if !located.duplicates.is_empty() {
                warnings.push(format!(
                    "package {} exists in more than one source; only the copy in {} will be updated",
                    package.id(),
                    located.repository.display()
                ));
            }
            package.repository = Some(located.repository);
        }
    }
    context.warnings.extend(warnings);

    for project_index in 0..context.projects.len() {
        let assembly = context.projects[project_index].assembly.clone();
        let package_index = context.package_index_by_assembly(&assembly);
        if let Some(package_index) = package_index {
            context.projects[project_index].package = Some(package_index);
            context.packages[package_index].project = Some(project_index);
        }
    }

    Ok(context)
}
