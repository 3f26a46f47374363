use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::model::ProfileRecord;
use crate::core::error::{InstallerError, InstallerResult};

pub const PROFILE_FILE_NAME: &str = "profile.json";

/// Strip characters outside letters/digits/space/hyphen/underscore and trim.
/// Falls back to "profile" when nothing survives.
pub fn sanitize_profile_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "profile".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Manages the lifecycle of profile directories on disk.
pub struct ProfileStore {
    /// Root directory where all profiles live.
    profiles_dir: PathBuf,
}

impl ProfileStore {
    pub fn new(profiles_dir: PathBuf) -> Self {
        Self { profiles_dir }
    }

    pub fn profiles_dir(&self) -> &Path {
        &self.profiles_dir
    }

    /// Pick a directory name not currently present under the profiles root
    /// and create it: `name`, then `name (1)`, `name (2)`, …
    ///
    /// Existence check and creation are synchronous with no suspension point
    /// in between, so two installs interleaving on the event loop cannot both
    /// claim the same name.
    pub fn allocate_dir(&self, display_name: &str) -> InstallerResult<(String, PathBuf)> {
        std::fs::create_dir_all(&self.profiles_dir).map_err(|source| InstallerError::Io {
            path: self.profiles_dir.clone(),
            source,
        })?;

        let base = sanitize_profile_name(display_name);
        let mut candidate = base.clone();
        let mut suffix = 1u32;

        while self.profiles_dir.join(&candidate).exists() {
            candidate = format!("{} ({})", base, suffix);
            suffix += 1;
        }

        let dir = self.profiles_dir.join(&candidate);
        std::fs::create_dir_all(&dir).map_err(|source| InstallerError::Io {
            path: dir.clone(),
            source,
        })?;

        info!("Allocated profile directory {:?}", dir);
        Ok((candidate, dir))
    }

    /// Save profile metadata to disk.
    pub async fn save(&self, record: &ProfileRecord) -> InstallerResult<()> {
        let json = serde_json::to_string_pretty(record)?;
        let record_path = record.record_path();

        tokio::fs::write(&record_path, json)
            .await
            .map_err(|source| InstallerError::Io {
                path: record_path,
                source,
            })?;

        Ok(())
    }

    /// Load a single profile by directory name.
    pub async fn load(&self, dir_name: &str) -> InstallerResult<ProfileRecord> {
        let record_path = self.profiles_dir.join(dir_name).join(PROFILE_FILE_NAME);
        if !record_path.exists() {
            return Err(InstallerError::ProfileNotFound(dir_name.to_string()));
        }

        let json = tokio::fs::read_to_string(&record_path)
            .await
            .map_err(|source| InstallerError::Io {
                path: record_path.clone(),
                source,
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// List all profiles. Corrupt or unreadable records are skipped with a
    /// warning rather than failing the whole listing.
    pub async fn list(&self) -> InstallerResult<Vec<ProfileRecord>> {
        let mut records = Vec::new();

        if !self.profiles_dir.exists() {
            return Ok(records);
        }

        let mut entries = tokio::fs::read_dir(&self.profiles_dir)
            .await
            .map_err(|source| InstallerError::Io {
                path: self.profiles_dir.clone(),
                source,
            })?;

        while let Some(entry) = entries.next_entry().await.map_err(|source| InstallerError::Io {
            path: self.profiles_dir.clone(),
            source,
        })? {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let record_path = path.join(PROFILE_FILE_NAME);
            if !record_path.exists() {
                continue;
            }
            match tokio::fs::read_to_string(&record_path).await {
                Ok(json) => match serde_json::from_str::<ProfileRecord>(&json) {
                    Ok(record) => records.push(record),
                    Err(e) => warn!("Corrupt profile.json at {:?}: {}", record_path, e),
                },
                Err(e) => warn!("Cannot read {:?}: {}", record_path, e),
            }
        }

        Ok(records)
    }

    /// Delete a profile directory and everything in it.
    pub async fn delete(&self, dir_name: &str) -> InstallerResult<()> {
        let dir = self.profiles_dir.join(dir_name);
        if !dir.exists() {
            return Err(InstallerError::ProfileNotFound(dir_name.to_string()));
        }

        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|source| InstallerError::Io { path: dir, source })?;

        info!("Deleted profile {}", dir_name);
        Ok(())
    }

    /// Existing profile installed from exactly this registry version, if any.
    /// Used as the duplicate pre-check before a pack install.
    pub async fn find_installed(
        &self,
        project_id: &str,
        version_id: &str,
    ) -> InstallerResult<Option<ProfileRecord>> {
        let records = self.list().await?;
        Ok(records.into_iter().find(|r| {
            r.source_project_id.as_deref() == Some(project_id)
                && r.source_version_id.as_deref() == Some(version_id)
        }))
    }
}
