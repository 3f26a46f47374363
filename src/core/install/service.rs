use std::path::PathBuf;
use std::sync::Arc;

use crate::core::downloader::{ArtifactDownloader, HttpDownloader};
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::build_http_client;
use crate::core::install::{
    ContentInstallRequest, ContentInstaller, PackInstallReport, PackInstallRequest, PackInstaller,
};
use crate::core::profile::ProfileStore;
use crate::core::progress::ProgressReporter;
use crate::core::registry::{HttpRegistry, RegistryClient, VersionFile};
use crate::core::tasks::InstallTaskRegistry;

/// Platform data directory for the launcher, with a cwd fallback.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Modweaver")
}

/// Entry point the presentation layer holds: one shared registry client,
/// one task registry, both installers wired to the same collaborators.
pub struct InstallService {
    registry: Arc<dyn RegistryClient>,
    tasks: Arc<InstallTaskRegistry>,
    profiles: Arc<ProfileStore>,
    content: ContentInstaller,
    packs: PackInstaller,
}

impl InstallService {
    /// Production wiring: HTTP registry and downloader sharing one client,
    /// profiles under `<data_dir>/profiles`, standalone content under
    /// `<data_dir>/mods`.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> InstallerResult<Self> {
        let data_dir = data_dir.into();
        let client = build_http_client()?;

        let registry: Arc<dyn RegistryClient> = Arc::new(HttpRegistry::new(client.clone()));
        let downloader: Arc<dyn ArtifactDownloader> = Arc::new(HttpDownloader::new(client));
        let profiles = Arc::new(ProfileStore::new(data_dir.join("profiles")));

        Ok(Self::with_components(
            registry,
            downloader,
            reporter,
            profiles,
            data_dir.join("mods"),
        ))
    }

    /// Injection constructor; tests swap in fakes here.
    pub fn with_components(
        registry: Arc<dyn RegistryClient>,
        downloader: Arc<dyn ArtifactDownloader>,
        reporter: Arc<dyn ProgressReporter>,
        profiles: Arc<ProfileStore>,
        default_content_dir: PathBuf,
    ) -> Self {
        let tasks = InstallTaskRegistry::new();

        let content = ContentInstaller::new(
            Arc::clone(&registry),
            Arc::clone(&downloader),
            Arc::clone(&tasks),
            Arc::clone(&reporter),
            default_content_dir,
        );
        let packs = PackInstaller::new(
            Arc::clone(&registry),
            downloader,
            Arc::clone(&tasks),
            reporter,
            Arc::clone(&profiles),
        );

        Self {
            registry,
            tasks,
            profiles,
            content,
            packs,
        }
    }

    pub fn registry(&self) -> &Arc<dyn RegistryClient> {
        &self.registry
    }

    pub fn profiles(&self) -> &Arc<ProfileStore> {
        &self.profiles
    }

    pub async fn install_content(
        &self,
        project_id: &str,
        request: &ContentInstallRequest,
    ) -> InstallerResult<VersionFile> {
        let project = self.registry.get_project(project_id).await?;
        self.content.install(&project, request).await
    }

    /// Install a pack into a fresh profile. When the caller pinned a specific
    /// version, a profile already installed from exactly that version is
    /// rejected up front; unpinned installs always create a new profile.
    pub async fn install_pack(
        &self,
        project_id: &str,
        request: &PackInstallRequest,
    ) -> InstallerResult<PackInstallReport> {
        if let Some(version_id) = &request.explicit_version_id {
            if self
                .profiles
                .find_installed(project_id, version_id)
                .await?
                .is_some()
            {
                return Err(InstallerError::AlreadyInstalled {
                    project_id: project_id.to_string(),
                    version_id: version_id.clone(),
                });
            }
        }

        let project = self.registry.get_project(project_id).await?;
        self.packs.install(&project, request).await
    }

    /// Request cancellation of a running install. Returns false when no
    /// install is active for the project.
    pub fn cancel_install(&self, project_id: &str) -> bool {
        self.tasks.cancel(project_id)
    }

    /// Project ids with an install currently running.
    pub fn active_installs(&self) -> Vec<String> {
        self.tasks.active()
    }
}
