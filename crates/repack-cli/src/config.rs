use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub package_sources: Vec<PathBuf>,
    pub archive_root: PathBuf,
    pub build: BuildCommands,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildCommands {
    pub project: String,
    pub solution: String,
    pub clean: String,
    #[serde(default)]
    pub reopen: Option<String>,
}

impl WorkspaceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: WorkspaceConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        if config.package_sources.is_empty() {
            bail!("config {} lists no package sources", path.display());
        }
        Ok(config)
    }
}
