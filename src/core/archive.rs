// ─── Archive Access ───
// Zip listing and full extraction. The zip crate is synchronous, so both
// operations run on the blocking pool.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{InstallerError, InstallerResult};

/// Entry names of an archive, in archive order.
pub async fn list_entries(archive_path: &Path) -> InstallerResult<Vec<String>> {
    let archive_path = archive_path.to_path_buf();
    tokio::task::spawn_blocking(move || list_entries_sync(&archive_path))
        .await
        .map_err(|e| InstallerError::Other(format!("archive task panicked: {e}")))?
}

/// Extract the archive's full contents into `dest_dir`, creating directories
/// as needed. Existing files are overwritten when `overwrite` is set and left
/// untouched otherwise.
pub async fn extract_all(
    archive_path: &Path,
    dest_dir: &Path,
    overwrite: bool,
) -> InstallerResult<()> {
    let archive_path = archive_path.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();
    tokio::task::spawn_blocking(move || extract_all_sync(&archive_path, &dest_dir, overwrite))
        .await
        .map_err(|e| InstallerError::Other(format!("archive task panicked: {e}")))?
}

fn open_archive(archive_path: &Path) -> InstallerResult<zip::ZipArchive<std::fs::File>> {
    let file = std::fs::File::open(archive_path).map_err(|source| InstallerError::Io {
        path: archive_path.to_path_buf(),
        source,
    })?;
    Ok(zip::ZipArchive::new(file)?)
}

fn list_entries_sync(archive_path: &Path) -> InstallerResult<Vec<String>> {
    let mut archive = open_archive(archive_path)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        entries.push(entry.name().to_string());
    }
    Ok(entries)
}

fn extract_all_sync(archive_path: &Path, dest_dir: &Path, overwrite: bool) -> InstallerResult<()> {
    let mut archive = open_archive(archive_path)?;

    std::fs::create_dir_all(dest_dir).map_err(|source| InstallerError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;

        // enclosed_name rejects absolute paths and `..` traversal.
        let rel_path: PathBuf = entry.enclosed_name().ok_or_else(|| {
            InstallerError::ExtractionFailed(format!("invalid entry path: {}", entry.name()))
        })?;

        if rel_path.as_os_str().is_empty() {
            continue;
        }

        let out_path = dest_dir.join(rel_path);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|source| InstallerError::Io {
                path: out_path,
                source,
            })?;
            continue;
        }

        if out_path.exists() && !overwrite {
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| InstallerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out = std::fs::File::create(&out_path).map_err(|source| InstallerError::Io {
            path: out_path.clone(),
            source,
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|source| InstallerError::Io {
            path: out_path,
            source,
        })?;
    }

    debug!("Extracted {:?} -> {:?}", archive_path, dest_dir);
    Ok(())
}
