use repack_core::{RunContext, UpdateError};

use crate::archive;
use crate::host::{BuildHost, FailureContext, ProgressSink, RecoveryChoice};

#[derive(Debug, Default)]
pub struct RollbackReport {
    pub recovered: usize,
    pub aborted: bool,
    pub partial: bool,
    pub warnings: Vec<String>,
}

pub fn run_rollback<H, P, F>(
    context: &mut RunContext,
    host: &mut H,
    progress: &mut P,
    choose: &mut F,
) -> Result<RollbackReport, UpdateError>
where
    H: BuildHost,
    P: ProgressSink,
    F: FnMut(&FailureContext<'_>) -> RecoveryChoice,
{
    let to_recover = context.updated_so_far.clone();
    let mut report = RollbackReport::default();

    progress.begin_stage("rollback", to_recover.len());
    let mut index = 0;
    while index < to_recover.len() {
        progress.advance(index);
        let package_index = to_recover[index];
        let id = context.packages[package_index].id().to_string();
        progress.status(&format!("rolling back {id}"));

        match rollback_package(context, package_index, host) {
            Ok(()) => index += 1,
            Err(error) => {
                let choice = choose(&FailureContext {
                    package_id: &id,
                    error: &error,
                    completed: context.recovered_so_far.len(),
                    during_rollback: true,
                });
                match choice {
                    RecoveryChoice::Abort => {
                        report.aborted = true;
                        break;
                    }
                    RecoveryChoice::Retry => {}
                    RecoveryChoice::Ignore => index += 1,
                }
            }
        }
    }
    progress.advance(to_recover.len());

    report.recovered = context.recovered_so_far.len();
    report.partial = report.recovered != to_recover.len();
    if context.archive_session.is_dir() {
        if let Err(error) = archive::remove_session_dir(&context.archive_session) {
            report.warnings.push(format!(
                "failed to remove the session archive directory: {error}"
            ));
        }
    }
    Ok(report)
}

fn rollback_package<H: BuildHost>(
    context: &mut RunContext,
    package_index: usize,
    host: &mut H,
) -> Result<(), UpdateError> {
    archive::restore_from_archive(&context.packages[package_index], &context.archive_session)?;

    if let Some(project_index) = context.packages[package_index].project {
        let name = context.projects[project_index].name.clone();
        if !host.build_project(&context.projects[project_index]) {
            return Err(UpdateError::BuildFailure { project: name });
        }
    }

    context.recovered_so_far.push(package_index);
    Ok(())
}
