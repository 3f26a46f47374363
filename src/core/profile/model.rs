use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Persisted result of a pack install, serialized as `profile.json` at the
/// profile root. The registry linkage fields let callers detect "this exact
/// version is already installed" before starting a second install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub name: String,
    pub game_version: String,
    pub loader: String,
    pub loader_version: Option<String>,
    pub path: PathBuf,
    pub source_project_id: Option<String>,
    pub source_version_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProfileRecord {
    pub fn new(name: String, game_version: String, loader: String, path: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            game_version,
            loader,
            loader_version: None,
            path,
            source_project_id: None,
            source_version_id: None,
            created_at: Utc::now(),
        }
    }

    /// Path to this profile's metadata file.
    pub fn record_path(&self) -> PathBuf {
        self.path.join(super::PROFILE_FILE_NAME)
    }
}
