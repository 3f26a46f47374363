use serde::{Deserialize, Serialize};

/// What kind of content a project ships.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Mod,
    Modpack,
    Shader,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectType::Mod => write!(f, "mod"),
            ProjectType::Modpack => write!(f, "modpack"),
            ProjectType::Shader => write!(f, "shader"),
            ProjectType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Registry project snapshot, fetched on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub project_type: ProjectType,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub downloads: u64,
    pub icon_url: Option<String>,
}

/// One release of a project. The registry returns versions newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub version_number: String,
    /// Supported game versions, ordered by the registry.
    pub game_versions: Vec<String>,
    pub loaders: Vec<String>,
    pub files: Vec<VersionFile>,
    #[serde(default)]
    pub dependencies: Vec<VersionDependency>,
    #[serde(default)]
    pub date_published: String,
    #[serde(default)]
    pub version_type: String,
}

/// Downloadable artifact within a version. At most one file per version is
/// flagged primary; when none is, the first file is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionFile {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub hashes: FileHashes,
}

/// Advisory checksums carried in the wire format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileHashes {
    pub sha1: Option<String>,
    pub sha512: Option<String>,
}

/// Reference from a version to another project it depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDependency {
    pub project_id: Option<String>,
    pub version_id: Option<String>,
    pub dependency_type: String,
}

/// Server-side version filtering. Empty fields are unconstrained — a pack
/// resolve uses the default (any loader, any game version) since the pack
/// commits to its own runtime versions.
#[derive(Debug, Clone, Default)]
pub struct VersionFilter {
    pub loaders: Vec<String>,
    pub game_versions: Vec<String>,
}

/// Search request for `search_projects`.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: String,
    pub project_type: Option<ProjectType>,
    pub game_version: Option<String>,
    pub loader: Option<String>,
    pub categories: Vec<String>,
    /// Registry sort index, e.g. "relevance" or "downloads".
    pub index: Option<String>,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub offset: u32,
    pub limit: u32,
    pub total_hits: u32,
}

/// Slimmer project representation returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(alias = "project_id")]
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub project_type: ProjectType,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub downloads: u64,
    pub icon_url: Option<String>,
}

// ── Tag vocabularies ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTag {
    pub name: String,
    pub project_type: String,
    #[serde(default)]
    pub header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameVersionTag {
    pub version: String,
    pub version_type: String,
    #[serde(default)]
    pub major: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderTag {
    pub name: String,
    #[serde(default)]
    pub supported_project_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_version_with_files() {
        let json = r#"{
            "id": "v123",
            "project_id": "AANobbMI",
            "name": "Sodium 0.5.8",
            "version_number": "mc1.20.1-0.5.8",
            "game_versions": ["1.20.1"],
            "loaders": ["fabric"],
            "files": [
                {
                    "url": "https://cdn.example.com/sodium.jar",
                    "filename": "sodium-fabric-1.20.1.jar",
                    "primary": true,
                    "size": 1048576,
                    "hashes": { "sha1": "abc123", "sha512": null }
                }
            ],
            "dependencies": [
                { "project_id": "P7dR8mSH", "version_id": null, "dependency_type": "required" }
            ]
        }"#;
        let version: Version = serde_json::from_str(json).unwrap();
        assert_eq!(version.id, "v123");
        assert_eq!(version.game_versions, vec!["1.20.1"]);
        assert!(version.files[0].primary);
        assert_eq!(version.files[0].hashes.sha1.as_deref(), Some("abc123"));
        assert_eq!(version.dependencies[0].dependency_type, "required");
    }

    #[test]
    fn deserialize_project_with_unknown_type() {
        let json = r#"{
            "id": "abcd",
            "slug": "some-pack",
            "title": "Some Pack",
            "project_type": "resourcepack",
            "downloads": 42,
            "icon_url": null
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.project_type, ProjectType::Unknown);
        assert!(project.author.is_empty());
        assert!(project.loaders.is_empty());
    }

    #[test]
    fn search_hit_accepts_project_id_alias() {
        let json = r#"{
            "project_id": "AANobbMI",
            "slug": "sodium",
            "title": "Sodium",
            "author": "jellysquid3",
            "project_type": "mod",
            "downloads": 1000,
            "icon_url": null
        }"#;
        let hit: SearchHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.id, "AANobbMI");
    }
}
