use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::core::downloader::{ArtifactDownloader, DownloadOutcome, DownloadRequest};
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::progress::{ProgressReporter, ProgressUpdate};
use crate::core::registry::{Project, RegistryClient, VersionFile};
use crate::core::resolver::{VersionConstraints, VersionResolver};
use crate::core::tasks::InstallTaskRegistry;

const STEP_DOWNLOADING_MOD: &str = "Downloading Mod";

/// Where and what to install. Without an instance path the platform default
/// content directory is used.
#[derive(Debug, Clone, Default)]
pub struct ContentInstallRequest {
    pub instance_path: Option<PathBuf>,
    pub game_version: Option<String>,
    pub loader: Option<String>,
    pub explicit_version_id: Option<String>,
}

/// Installs one standalone artifact (a mod file) into a content directory.
pub struct ContentInstaller {
    resolver: VersionResolver,
    downloader: Arc<dyn ArtifactDownloader>,
    tasks: Arc<InstallTaskRegistry>,
    reporter: Arc<dyn ProgressReporter>,
    default_content_dir: PathBuf,
}

impl ContentInstaller {
    pub fn new(
        registry: Arc<dyn RegistryClient>,
        downloader: Arc<dyn ArtifactDownloader>,
        tasks: Arc<InstallTaskRegistry>,
        reporter: Arc<dyn ProgressReporter>,
        default_content_dir: PathBuf,
    ) -> Self {
        Self {
            resolver: VersionResolver::new(registry),
            downloader,
            tasks,
            reporter,
            default_content_dir,
        }
    }

    /// Resolve, download and place the project's file. Fails fast with
    /// `AlreadyInProgress` when an install for this project is active.
    pub async fn install(
        &self,
        project: &Project,
        request: &ContentInstallRequest,
    ) -> InstallerResult<VersionFile> {
        let guard = self.tasks.begin(&project.id)?;

        let content_dir = match &request.instance_path {
            Some(instance_path) => instance_path.join("mods"),
            None => self.default_content_dir.clone(),
        };
        tokio::fs::create_dir_all(&content_dir)
            .await
            .map_err(|source| InstallerError::Io {
                path: content_dir.clone(),
                source,
            })?;

        let constraints = VersionConstraints {
            explicit_version_id: request.explicit_version_id.clone(),
            game_version: request.game_version.clone(),
            loader: request.loader.clone(),
        };
        let resolved = self.resolver.resolve(project, &constraints).await?;

        // A cancel issued while we were resolving takes effect here, before
        // the transfer starts.
        guard.ensure_active()?;

        let download = DownloadRequest::new(
            resolved.file.url.clone(),
            content_dir,
            resolved.file.filename.clone(),
        );

        let reporter = Arc::clone(&self.reporter);
        let project_id = project.id.clone();
        let on_progress = move |tick: crate::core::downloader::DownloadTick| {
            reporter.report(ProgressUpdate {
                project_id: project_id.clone(),
                step: STEP_DOWNLOADING_MOD.to_string(),
                percent: tick.percent(),
                bytes_done: tick.bytes_done,
                bytes_total: tick.bytes_total,
                rate: tick.rate,
            });
        };

        let outcome = self
            .downloader
            .download(&download, &on_progress, guard.token())
            .await?;

        match outcome {
            DownloadOutcome::Completed => {
                info!(
                    "Installed '{}' ({}) into {:?}",
                    project.slug,
                    resolved.file.filename,
                    download.dest_dir
                );
                Ok(resolved.file)
            }
            DownloadOutcome::Stopped => Err(InstallerError::Cancelled),
        }
    }
}
