use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::PackageManifest;

#[derive(Debug, Clone)]
pub struct PackageRecord {
    pub manifest: PackageManifest,
    pub repository: Option<PathBuf>,
    pub project: Option<usize>,
    pub new_artifact_name: Option<String>,
    pub new_version: Option<Version>,
}

impl PackageRecord {
    pub fn new(manifest: PackageManifest) -> Self {
        Self {
            manifest,
            repository: None,
            project: None,
            new_artifact_name: None,
            new_version: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    pub fn version(&self) -> &Version {
        &self.manifest.version
    }

    pub fn artifact_file_name(&self) -> String {
        self.manifest.artifact_file_name()
    }

    pub fn artifact_path(&self) -> Option<PathBuf> {
        self.repository
            .as_ref()
            .map(|repository| repository.join(self.artifact_file_name()))
    }

    pub fn assembly_name(&self) -> Option<&str> {
        let entry = self.manifest.lib_files.last()?;
        Path::new(entry).file_stem()?.to_str()
    }
}

#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub name: String,
    pub assembly: String,
    pub manifest_path: PathBuf,
    pub directory: PathBuf,
    pub output_dir: PathBuf,
    pub version: Version,
    pub references: Vec<String>,
    pub local_mode: bool,
    pub built: bool,
    pub package: Option<usize>,
}

#[derive(Debug)]
pub struct RunContext {
    pub pre_release: bool,
    pub sources: Vec<PathBuf>,
    pub archive_session: PathBuf,
    pub packages: Vec<PackageRecord>,
    pub projects: Vec<ProjectRecord>,
    pub updated_so_far: Vec<usize>,
    pub recovered_so_far: Vec<usize>,
    pub warnings: Vec<String>,
}

impl RunContext {
    pub fn new(pre_release: bool, sources: Vec<PathBuf>, archive_session: PathBuf) -> Self {
        Self {
            pre_release,
            sources,
            archive_session,
            packages: Vec::new(),
            projects: Vec::new(),
            updated_so_far: Vec::new(),
            recovered_so_far: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn session_label() -> String {
        chrono::Local::now().format("%Y-%m-%d %H_%M_%S").to_string()
    }

    pub fn package_index_by_assembly(&self, assembly: &str) -> Option<usize> {
        self.packages
            .iter()
            .position(|package| package.assembly_name() == Some(assembly))
    }

    pub fn any_project_in_local_mode(&self) -> bool {
        self.projects.iter().any(|project| project.local_mode)
    }

    pub fn updated_versions(&self) -> BTreeMap<String, Version> {
        self.updated_so_far
            .iter()
            .filter_map(|&index| {
                let package = &self.packages[index];
                package
                    .new_version
                    .clone()
                    .map(|version| (package.id().to_string(), version))
            })
            .collect()
    }
}
