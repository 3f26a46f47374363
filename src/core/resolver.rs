// ─── Version Resolver ───
// Given a project and runtime constraints, selects one Version and, within
// it, the File to download. Pure query + selection; no side effects.

use std::sync::Arc;

use tracing::debug;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::registry::{Project, RegistryClient, Version, VersionFile, VersionFilter};

/// Constraints for a resolve. An explicit version id bypasses filtering —
/// the caller has already chosen.
#[derive(Debug, Clone, Default)]
pub struct VersionConstraints {
    pub explicit_version_id: Option<String>,
    pub game_version: Option<String>,
    pub loader: Option<String>,
}

impl VersionConstraints {
    /// Unconstrained resolve, used for packs: the pack commits to its own
    /// runtime versions, so any loader / any game version is acceptable.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn explicit(version_id: impl Into<String>) -> Self {
        Self {
            explicit_version_id: Some(version_id.into()),
            ..Default::default()
        }
    }
}

/// Resolution result: one version, one file.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub version: Version,
    pub file: VersionFile,
}

pub struct VersionResolver {
    registry: Arc<dyn RegistryClient>,
}

impl VersionResolver {
    pub fn new(registry: Arc<dyn RegistryClient>) -> Self {
        Self { registry }
    }

    pub async fn resolve(
        &self,
        project: &Project,
        constraints: &VersionConstraints,
    ) -> InstallerResult<Resolved> {
        let version = match constraints.explicit_version_id.as_deref() {
            Some(version_id) => self.registry.get_version(version_id).await?,
            None => {
                let filter = VersionFilter {
                    loaders: constraints.loader.iter().cloned().collect(),
                    game_versions: constraints.game_version.iter().cloned().collect(),
                };
                let versions = self.registry.get_versions(&project.id, &filter).await?;

                // The registry returns versions newest-first; take the first
                // without client-side ranking. Deliberate compatibility
                // decision — do not re-rank here.
                versions
                    .into_iter()
                    .next()
                    .ok_or_else(|| InstallerError::NoCompatibleVersion {
                        project: project.slug.clone(),
                    })?
            }
        };

        let file = choose_file(&version)?;
        debug!(
            "Resolved '{}' -> version {} file {}",
            project.slug, version.id, file.filename
        );

        Ok(Resolved { version, file })
    }
}

/// The file flagged primary, else the first file. A version with zero files
/// cannot be installed.
pub fn choose_file(version: &Version) -> InstallerResult<VersionFile> {
    version
        .files
        .iter()
        .find(|f| f.primary)
        .or_else(|| version.files.first())
        .cloned()
        .ok_or_else(|| InstallerError::NoFileAvailable {
            version: version.id.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::{fake_project, fake_version, FakeRegistry};

    fn resolver(registry: FakeRegistry) -> VersionResolver {
        VersionResolver::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn explicit_version_id_bypasses_filtering() {
        let mut registry = FakeRegistry::default();
        let wanted = fake_version("v-old", "proj", &["1.18.2"], &["forge"]);
        registry.add_version(wanted);
        registry.add_version(fake_version("v-new", "proj", &["1.20.1"], &["fabric"]));

        let project = fake_project("proj", "example");
        let resolved = resolver(registry)
            .resolve(&project, &VersionConstraints::explicit("v-old"))
            .await
            .unwrap();

        assert_eq!(resolved.version.id, "v-old");
    }

    #[tokio::test]
    async fn takes_first_version_from_filtered_list() {
        let mut registry = FakeRegistry::default();
        registry.add_version(fake_version("v2", "proj", &["1.20.1"], &["fabric"]));
        registry.add_version(fake_version("v1", "proj", &["1.20.1"], &["fabric"]));

        let project = fake_project("proj", "example");
        let constraints = VersionConstraints {
            game_version: Some("1.20.1".into()),
            loader: Some("fabric".into()),
            ..Default::default()
        };
        let resolved = resolver(registry)
            .resolve(&project, &constraints)
            .await
            .unwrap();

        assert_eq!(resolved.version.id, "v2");
    }

    #[tokio::test]
    async fn empty_filtered_list_is_no_compatible_version() {
        let mut registry = FakeRegistry::default();
        registry.add_version(fake_version("v1", "proj", &["1.19.2"], &["forge"]));

        let project = fake_project("proj", "example");
        let constraints = VersionConstraints {
            game_version: Some("1.20.1".into()),
            loader: Some("fabric".into()),
            ..Default::default()
        };
        let err = resolver(registry)
            .resolve(&project, &constraints)
            .await
            .unwrap_err();

        assert!(matches!(err, InstallerError::NoCompatibleVersion { .. }));
    }

    #[test]
    fn primary_file_wins_over_first() {
        let mut version = fake_version("v1", "proj", &["1.20.1"], &["fabric"]);
        version.files[0].primary = false;
        version.files.push(VersionFile {
            url: "https://cdn.example.com/sources.jar".into(),
            filename: "sources.jar".into(),
            primary: true,
            size: 10,
            hashes: Default::default(),
        });

        let file = choose_file(&version).unwrap();
        assert_eq!(file.filename, "sources.jar");
    }

    #[test]
    fn no_primary_flag_falls_back_to_first_file() {
        let mut version = fake_version("v1", "proj", &["1.20.1"], &["fabric"]);
        version.files[0].primary = false;
        version.files.push(VersionFile {
            url: "https://cdn.example.com/extra.jar".into(),
            filename: "extra.jar".into(),
            primary: false,
            size: 10,
            hashes: Default::default(),
        });

        let file = choose_file(&version).unwrap();
        assert_eq!(file.filename, "v1.jar");
    }

    #[test]
    fn zero_files_is_no_file_available() {
        let mut version = fake_version("v1", "proj", &["1.20.1"], &["fabric"]);
        version.files.clear();

        let err = choose_file(&version).unwrap_err();
        assert!(matches!(err, InstallerError::NoFileAvailable { .. }));
    }
}
