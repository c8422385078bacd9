use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use repack_core::{PackageRecord, UpdateError};
use walkdir::WalkDir;

pub fn archive_current(record: &PackageRecord, session: &Path) -> Result<(), UpdateError> {
    let Some(source) = record.artifact_path() else {
        return Err(UpdateError::MissingRepository {
            id: record.id().to_string(),
        });
    };
    fs::create_dir_all(session)
        .map_err(|err| UpdateError::io("create session dir", session, err))?;

    let target = session.join(record.artifact_file_name());
    fs::rename(&source, &target).map_err(|err| UpdateError::io("archive artifact", &source, err))
}

pub fn restore_from_archive(record: &PackageRecord, session: &Path) -> Result<(), UpdateError> {
    let Some(repository) = record.repository.as_deref() else {
        return Err(UpdateError::MissingRepository {
            id: record.id().to_string(),
        });
    };
    let file_name = record.artifact_file_name();
    let archived = session.join(&file_name);
    let target = repository.join(&file_name);

    let restored = if !archived.exists() && target.exists() {
        Ok(())
    } else {
        fs::rename(&archived, &target)
            .map_err(|err| UpdateError::io("restore artifact", &archived, err))
    };

    let mut removed = Ok(());
    if let Some(new_name) = record.new_artifact_name.as_deref() {
        let new_path = repository.join(new_name);
        if new_path.exists() {
            removed = fs::remove_file(&new_path)
                .map_err(|err| UpdateError::io("delete new artifact", &new_path, err));
        }
    }

    restored.and(removed)
}

pub fn finalize_session(session: &Path) -> Result<PathBuf, UpdateError> {
    if !session.is_dir() {
        return Err(UpdateError::archive(session, "session directory does not exist"));
    }
    let file_name = session
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| UpdateError::archive(session, "invalid session directory name"))?;
    let zip_path = session.with_file_name(format!("{file_name}.zip"));

    let file =
        File::create(&zip_path).map_err(|err| UpdateError::io("create archive", &zip_path, err))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();

    for entry in WalkDir::new(session).sort_by_file_name() {
        let entry = entry.map_err(|err| UpdateError::archive(session, err.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(session)
            .map_err(|err| UpdateError::archive(entry.path(), err.to_string()))?;
        let entry_name = relative.to_string_lossy().replace('\\', "/");
        writer
            .start_file(entry_name, options)
            .map_err(|err| UpdateError::archive(&zip_path, err.to_string()))?;
        let mut reader = File::open(entry.path())
            .map_err(|err| UpdateError::io("read archived artifact", entry.path(), err))?;
        io::copy(&mut reader, &mut writer)
            .map_err(|err| UpdateError::io("write archive", &zip_path, err))?;
    }
    writer
        .finish()
        .map_err(|err| UpdateError::archive(&zip_path, err.to_string()))?;

    fs::remove_dir_all(session)
        .map_err(|err| UpdateError::io("remove session dir", session, err))?;
    Ok(zip_path)
}

pub fn remove_session_dir(session: &Path) -> Result<(), UpdateError> {
    fs::remove_dir(session).map_err(|err| UpdateError::io("remove session dir", session, err))
}
