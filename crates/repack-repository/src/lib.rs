use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use repack_core::{PackageManifest, UpdateError, ARTIFACT_EXTENSION, MANIFEST_ENTRY};
use semver::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedArtifact {
    pub repository: PathBuf,
    pub duplicates: Vec<PathBuf>,
}

pub fn read_artifact_manifest(path: &Path) -> Result<PackageManifest, UpdateError> {
    let file = File::open(path).map_err(|err| UpdateError::io("open artifact", path, err))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|err| UpdateError::archive(path, err.to_string()))?;
    let mut entry = archive.by_name(MANIFEST_ENTRY).map_err(|err| {
        UpdateError::archive(path, format!("missing {MANIFEST_ENTRY} entry: {err}"))
    })?;
    let mut raw = String::new();
    entry
        .read_to_string(&mut raw)
        .map_err(|err| UpdateError::io("read manifest entry", path, err))?;
    PackageManifest::from_toml_str(&raw).map_err(|err| UpdateError::manifest(path, err.to_string()))
}

pub fn list_source(source: &Path) -> Result<Vec<PackageManifest>, UpdateError> {
    if !source.is_dir() {
        return Ok(Vec::new());
    }

    let entries =
        fs::read_dir(source).map_err(|err| UpdateError::io("list source", source, err))?;
    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| UpdateError::io("list source", source, err))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some(ARTIFACT_EXTENSION) {
            artifacts.push(path);
        }
    }
    artifacts.sort();

    artifacts
        .iter()
        .map(|path| read_artifact_manifest(path))
        .collect()
}

pub fn aggregate_sources(sources: &[PathBuf]) -> Result<Vec<PackageManifest>, UpdateError> {
    let mut manifests = Vec::new();
    for source in sources {
        manifests.extend(list_source(source)?);
    }
    Ok(manifests)
}

pub fn locate_artifact(sources: &[PathBuf], file_name: &str) -> Option<LocatedArtifact> {
    let mut located: Option<LocatedArtifact> = None;
    for source in sources {
        if !source.join(file_name).is_file() {
            continue;
        }
        match located.as_mut() {
            None => {
                located = Some(LocatedArtifact {
                    repository: source.clone(),
                    duplicates: Vec::new(),
                });
            }
            Some(found) => found.duplicates.push(source.clone()),
        }
    }
    located
}

pub fn latest_version(repository: &Path, id: &str) -> Result<Option<Version>, UpdateError> {
    if !repository.is_dir() {
        return Ok(None);
    }

    let entries = fs::read_dir(repository)
        .map_err(|err| UpdateError::io("list repository", repository, err))?;
    let mut latest: Option<Version> = None;
    for entry in entries {
        let entry = entry.map_err(|err| UpdateError::io("list repository", repository, err))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some((file_id, version)) = parse_artifact_file_name(name) else {
            continue;
        };
        if file_id == id && latest.as_ref().map(|seen| version > *seen).unwrap_or(true) {
            latest = Some(version);
        }
    }
    Ok(latest)
}

pub fn parse_artifact_file_name(file_name: &str) -> Option<(String, Version)> {
    let suffix = format!(".{ARTIFACT_EXTENSION}");
    let stem = file_name.strip_suffix(&suffix)?;
    for (index, _) in stem.match_indices('.') {
        if let Ok(version) = Version::parse(&stem[index + 1..]) {
            return Some((stem[..index].to_string(), version));
        }
    }
    None
}

pub fn extract_content(artifact: &Path, dest_root: &Path) -> Result<(), UpdateError> {
    let file = File::open(artifact).map_err(|err| UpdateError::io("open artifact", artifact, err))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|err| UpdateError::archive(artifact, err.to_string()))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| UpdateError::archive(artifact, err.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            continue;
        };
        if !relative.starts_with("content") {
            continue;
        }

        let target = dest_root.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| UpdateError::io("create content dir", parent.to_path_buf(), err))?;
        }
        let mut out =
            File::create(&target).map_err(|err| UpdateError::io("extract content", &target, err))?;
        io::copy(&mut entry, &mut out)
            .map_err(|err| UpdateError::io("extract content", &target, err))?;
    }
    Ok(())
}
