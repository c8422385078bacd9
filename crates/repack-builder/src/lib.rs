use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use repack_core::{
    aggregate_version, artifact_file_name, next_version, PackageManifest, UpdateError,
    MANIFEST_ENTRY,
};
use semver::{Version, VersionReq};

pub struct BuildRequest<'a> {
    pub manifest: &'a PackageManifest,
    pub old_artifact: &'a Path,
    pub build_output: Option<&'a Path>,
    pub assembly_version: Option<&'a Version>,
    pub destination: &'a Path,
    pub updated_dependencies: &'a BTreeMap<String, Version>,
    pub pre_release: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    pub file_name: String,
    pub version: Version,
    pub path: PathBuf,
}

pub fn build_artifact(request: &BuildRequest<'_>) -> Result<BuiltArtifact, UpdateError> {
    let manifest = request.manifest;

    let version = match (request.build_output, request.assembly_version) {
        (Some(_), Some(assembly)) => {
            next_version(&manifest.version, assembly, request.pre_release)?
        }
        _ => aggregate_version(
            &manifest.version,
            manifest
                .dependency_ids()
                .filter_map(|id| request.updated_dependencies.get(id)),
            request.pre_release,
        ),
    };

    let mut new_manifest = manifest.clone();
    new_manifest.version = version.clone();
    new_manifest.dependencies = resolve_dependencies(manifest, request.destination)?;

    let content_root = materialize_content(manifest, request.old_artifact, request.destination)?;

    let file_name = artifact_file_name(&manifest.id, &version);
    let path = request.destination.join(&file_name);
    let file = File::create(&path).map_err(|err| UpdateError::io("create artifact", &path, err))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();

    let serialized = new_manifest
        .to_toml_string()
        .map_err(|err| UpdateError::manifest(&path, err.to_string()))?;
    writer
        .start_file(MANIFEST_ENTRY, options)
        .map_err(|err| UpdateError::archive(&path, err.to_string()))?;
    writer
        .write_all(serialized.as_bytes())
        .map_err(|err| UpdateError::io("write artifact", &path, err))?;

    match request.build_output {
        Some(output) => {
            for entry in &manifest.lib_files {
                let source = output.join(payload_relative_path(entry));
                let mut reader = File::open(&source)
                    .map_err(|err| UpdateError::io("open build output", &source, err))?;
                writer
                    .start_file(entry.as_str(), options)
                    .map_err(|err| UpdateError::archive(&path, err.to_string()))?;
                io::copy(&mut reader, &mut writer)
                    .map_err(|err| UpdateError::io("write artifact", &path, err))?;
            }
        }
        None => {
            let old = File::open(request.old_artifact)
                .map_err(|err| UpdateError::io("open artifact", request.old_artifact, err))?;
            let mut old_archive = zip::ZipArchive::new(old)
                .map_err(|err| UpdateError::archive(request.old_artifact, err.to_string()))?;
            for entry in &manifest.lib_files {
                let mut bytes = Vec::new();
                old_archive
                    .by_name(entry)
                    .map_err(|err| UpdateError::archive(request.old_artifact, err.to_string()))?
                    .read_to_end(&mut bytes)
                    .map_err(|err| UpdateError::io("read artifact", request.old_artifact, err))?;
                writer
                    .start_file(entry.as_str(), options)
                    .map_err(|err| UpdateError::archive(&path, err.to_string()))?;
                writer
                    .write_all(&bytes)
                    .map_err(|err| UpdateError::io("write artifact", &path, err))?;
            }
        }
    }

    if let Some(content_root) = content_root {
        for entry in &manifest.content_files {
            let source = content_root.join(entry);
            let mut reader =
                File::open(&source).map_err(|err| UpdateError::io("open content", &source, err))?;
            writer
                .start_file(entry.as_str(), options)
                .map_err(|err| UpdateError::archive(&path, err.to_string()))?;
            io::copy(&mut reader, &mut writer)
                .map_err(|err| UpdateError::io("write artifact", &path, err))?;
        }
    }

    writer
        .finish()
        .map_err(|err| UpdateError::archive(&path, err.to_string()))?;

    Ok(BuiltArtifact {
        file_name,
        version,
        path,
    })
}

fn resolve_dependencies(
    manifest: &PackageManifest,
    destination: &Path,
) -> Result<BTreeMap<String, VersionReq>, UpdateError> {
    let mut resolved = BTreeMap::new();
    for (id, declared) in &manifest.dependencies {
        let requirement = match repack_repository::latest_version(destination, id)? {
            Some(latest) => VersionReq::parse(&latest.to_string())
                .unwrap_or_else(|_| declared.clone()),
            None => declared.clone(),
        };
        resolved.insert(id.clone(), requirement);
    }
    Ok(resolved)
}

fn materialize_content(
    manifest: &PackageManifest,
    old_artifact: &Path,
    destination: &Path,
) -> Result<Option<PathBuf>, UpdateError> {
    if manifest.content_files.is_empty() {
        return Ok(None);
    }
    let root = destination.join(&manifest.id);
    if !root.exists() {
        repack_repository::extract_content(old_artifact, &root)?;
    }
    Ok(Some(root))
}

fn payload_relative_path(entry: &str) -> &str {
    entry.strip_prefix("lib/").unwrap_or(entry)
}
