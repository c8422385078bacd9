use std::io;
use std::path::PathBuf;

use semver::Version;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("package version {package} is not behind the freshly built version {assembly}; increment the project version before republishing")]
    OutOfSync { package: Version, assembly: Version },

    #[error("failed to build project {project}")]
    BuildFailure { project: String },

    #[error("{action} failed for {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive operation failed for {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },

    #[error("invalid package manifest in {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("package {id} was not found in any configured source")]
    MissingRepository { id: String },

    #[error("dependency cycle detected involving: {}", members.join(", "))]
    DependencyCycle { members: Vec<String> },

    #[error("no projects are loaded in the workspace")]
    NoProjects,

    #[error("workspace is in local-reference mode; switch back to package mode before updating")]
    LocalReferenceMode,

    #[error("workspace build failed; fix the build before updating packages")]
    PreflightBuildFailed,
}

impl UpdateError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn archive(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
