use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use repack_core::ProjectRecord;
use semver::Version;
use serde::Deserialize;
use walkdir::WalkDir;

pub const PROJECT_MANIFEST: &str = "project.repack.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectManifest {
    name: String,
    #[serde(default)]
    assembly: Option<String>,
    version: Version,
    #[serde(default = "default_output")]
    output: PathBuf,
    #[serde(default)]
    mode: ProjectMode,
    #[serde(default)]
    references: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ProjectMode {
    #[default]
    Package,
    Local,
}

fn default_output() -> PathBuf {
    PathBuf::from("out")
}

pub fn discover_projects(root: &Path) -> Result<Vec<ProjectRecord>> {
    let mut projects = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to scan workspace {}", root.display()))?;
        if entry.file_type().is_file() && entry.file_name() == PROJECT_MANIFEST {
            projects.push(load_project(entry.path())?);
        }
    }
    Ok(projects)
}

fn load_project(manifest_path: &Path) -> Result<ProjectRecord> {
    let text = fs::read_to_string(manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let manifest: ProjectManifest = toml::from_str(&text)
        .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

    let directory = manifest_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let output_dir = directory.join(&manifest.output);
    Ok(ProjectRecord {
        assembly: manifest.assembly.unwrap_or_else(|| manifest.name.clone()),
        name: manifest.name,
        manifest_path: manifest_path.to_path_buf(),
        output_dir,
        directory,
        version: manifest.version,
        references: manifest.references,
        local_mode: manifest.mode == ProjectMode::Local,
        built: false,
        package: None,
    })
}
