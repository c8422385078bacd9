use std::collections::BTreeMap;

use anyhow::{anyhow, Context};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

pub const ARTIFACT_EXTENSION: &str = "rpk";
pub const MANIFEST_ENTRY: &str = "manifest.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageManifest {
    pub id: String,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default)]
    pub lib_files: Vec<String>,
    #[serde(default)]
    pub content_files: Vec<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, VersionReq>,
}

impl PackageManifest {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let manifest: Self = toml::from_str(input).context("failed to parse package manifest")?;
        if manifest.id.trim().is_empty() {
            return Err(anyhow!("package id must not be empty"));
        }
        if manifest.dependencies.contains_key(&manifest.id) {
            return Err(anyhow!("package '{}' depends on itself", manifest.id));
        }
        for file in &manifest.lib_files {
            if !file.starts_with("lib/") || file.len() == "lib/".len() {
                return Err(anyhow!(
                    "lib file '{}' of package '{}' must sit under lib/",
                    file,
                    manifest.id
                ));
            }
        }
        for file in &manifest.content_files {
            if !file.starts_with("content/") || file.len() == "content/".len() {
                return Err(anyhow!(
                    "content file '{}' of package '{}' must sit under content/",
                    file,
                    manifest.id
                ));
            }
        }
        Ok(manifest)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string(self).with_context(|| {
            format!("failed to serialize manifest for package '{}'", self.id)
        })
    }

    pub fn artifact_file_name(&self) -> String {
        artifact_file_name(&self.id, &self.version)
    }

    pub fn dependency_ids(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }
}

pub fn artifact_file_name(id: &str, version: &Version) -> String {
    format!("{id}.{version}.{ARTIFACT_EXTENSION}")
}
