// ─── Pack Manifest ───
// The dependency manifest a pack archive ships at its root. Once present it
// is the higher-trust source for runtime versions: it reflects what the
// pack's author actually shipped, so its values override registry metadata.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::error::{InstallerError, InstallerResult};

pub const PACK_MANIFEST_NAME: &str = "modrinth.index.json";

/// Manifest dependency keys that pin a loader version, in precedence order.
const LOADER_KEYS: [&str; 4] = ["fabric-loader", "forge", "neoforge", "quilt-loader"];

#[derive(Debug, Deserialize)]
pub struct PackManifest {
    #[serde(rename = "formatVersion", default)]
    pub format_version: u32,
    #[serde(rename = "versionId", default)]
    pub version_id: String,
    #[serde(default)]
    pub name: String,
    /// Pinned runtime versions: `minecraft`, plus a loader-specific key.
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
    #[serde(default)]
    pub files: Vec<PackManifestFile>,
}

/// One auxiliary file the pack needs, addressed relative to the profile root.
#[derive(Debug, Deserialize)]
pub struct PackManifestFile {
    pub path: String,
    /// Mirror URLs, tried in order.
    pub downloads: Vec<String>,
    #[serde(rename = "fileSize", default)]
    pub file_size: u64,
    /// Advisory checksums; not verified by this pipeline.
    #[serde(default)]
    pub hashes: HashMap<String, String>,
}

impl PackManifest {
    /// Read the manifest from a profile directory. `Ok(None)` when no
    /// manifest file exists; a parse failure is an error the caller treats
    /// as non-fatal.
    pub async fn load(profile_dir: &Path) -> InstallerResult<Option<PackManifest>> {
        let path = profile_dir.join(PACK_MANIFEST_NAME);
        if !path.exists() {
            return Ok(None);
        }

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| InstallerError::ManifestParse(format!("cannot read {:?}: {}", path, e)))?;

        let manifest: PackManifest = serde_json::from_str(&raw)
            .map_err(|e| InstallerError::ManifestParse(e.to_string()))?;

        Ok(Some(manifest))
    }

    /// Game version pinned by the manifest.
    pub fn game_version(&self) -> Option<&str> {
        self.dependencies.get("minecraft").map(String::as_str)
    }

    /// Loader name and pinned version, if the manifest declares one.
    /// `fabric-loader` is checked before `forge`.
    pub fn loader(&self) -> Option<(&'static str, &str)> {
        for key in LOADER_KEYS {
            if let Some(version) = self.dependencies.get(key) {
                let name = match key {
                    "fabric-loader" => "fabric",
                    "quilt-loader" => "quilt",
                    "neoforge" => "neoforge",
                    _ => "forge",
                };
                return Some((name, version));
            }
        }
        None
    }
}
