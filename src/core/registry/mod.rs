// ─── Content Registry ───
// Client for the remote content registry: project search, project/version
// lookup and tag vocabularies. Everything here is a read-only snapshot; the
// crate never persists registry data locally.

mod client;
mod model;

pub use client::{HttpRegistry, RegistryClient};
pub use model::{
    CategoryTag, FileHashes, GameVersionTag, LoaderTag, Project, ProjectType, SearchHit,
    SearchQuery, SearchResults, Version, VersionDependency, VersionFile, VersionFilter,
};
