use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::manifest::PackManifest;
use crate::core::archive;
use crate::core::downloader::{ArtifactDownloader, DownloadOutcome, DownloadRequest, DownloadTick};
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::profile::{ProfileRecord, ProfileStore};
use crate::core::progress::{ProgressReporter, ProgressUpdate};
use crate::core::registry::{Project, RegistryClient};
use crate::core::resolver::{VersionConstraints, VersionResolver};
use crate::core::tasks::{InstallTaskRegistry, TaskGuard};

const STEP_DOWNLOADING_PACK: &str = "Downloading Modpack";

/// Subtrees the pack archive may ship that get merged into the profile root.
const OVERRIDE_DIRS: [&str; 2] = ["overrides", "client-overrides"];

#[derive(Debug, Clone, Default)]
pub struct PackInstallRequest {
    /// Display name for the new profile; the project title when absent.
    pub instance_name: Option<String>,
    pub explicit_version_id: Option<String>,
}

/// Non-fatal problems encountered during a pack install. The install still
/// succeeds: playable content is in place, these are refinements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallWarning {
    ManifestParse(String),
    OverrideFlatten(String),
    MetadataWrite(String),
    FileSkipped { path: String, reason: String },
}

/// Result of a successful pack install.
#[derive(Debug)]
pub struct PackInstallReport {
    pub record: ProfileRecord,
    pub warnings: Vec<InstallWarning>,
}

/// Installs a bundled content pack: allocate a profile directory, download
/// and extract the pack archive, flatten overrides, reconcile the embedded
/// dependency manifest against registry data (the manifest wins), download
/// every manifest-listed file, persist the profile record.
pub struct PackInstaller {
    resolver: VersionResolver,
    downloader: Arc<dyn ArtifactDownloader>,
    tasks: Arc<InstallTaskRegistry>,
    reporter: Arc<dyn ProgressReporter>,
    profiles: Arc<ProfileStore>,
}

impl PackInstaller {
    pub fn new(
        registry: Arc<dyn RegistryClient>,
        downloader: Arc<dyn ArtifactDownloader>,
        tasks: Arc<InstallTaskRegistry>,
        reporter: Arc<dyn ProgressReporter>,
        profiles: Arc<ProfileStore>,
    ) -> Self {
        Self {
            resolver: VersionResolver::new(registry),
            downloader,
            tasks,
            reporter,
            profiles,
        }
    }

    pub async fn install(
        &self,
        project: &Project,
        request: &PackInstallRequest,
    ) -> InstallerResult<PackInstallReport> {
        let guard = self.tasks.begin(&project.id)?;
        let mut warnings = Vec::new();

        // ── Stage 1: allocate ───────────────────────────
        // The directory is created before any network I/O; a failed download
        // leaves an empty directory behind, and the next attempt simply picks
        // the next numeric suffix.
        let display_name = request
            .instance_name
            .as_deref()
            .unwrap_or(&project.title);
        let (dir_name, profile_dir) = self.profiles.allocate_dir(display_name)?;

        // ── Stage 2: resolve ────────────────────────────
        guard.ensure_active()?;
        let constraints = match &request.explicit_version_id {
            Some(id) => VersionConstraints::explicit(id.clone()),
            // A pack commits to its own runtime versions, so no loader /
            // game-version filtering is applied.
            None => VersionConstraints::any(),
        };
        let resolved = self.resolver.resolve(project, &constraints).await?;

        // ── Stage 3: download pack archive ──────────────
        guard.ensure_active()?;
        let download = DownloadRequest::new(
            resolved.file.url.clone(),
            profile_dir.clone(),
            resolved.file.filename.clone(),
        );
        let outcome = self
            .download_with_progress(&guard, &download, STEP_DOWNLOADING_PACK, None)
            .await?;
        if outcome == DownloadOutcome::Stopped {
            return Err(InstallerError::Cancelled);
        }

        // ── Stage 4: extract ────────────────────────────
        guard.ensure_active()?;
        let archive_path = download.dest_path();
        archive::extract_all(&archive_path, &profile_dir, true).await?;
        if let Err(e) = tokio::fs::remove_file(&archive_path).await {
            warn!("Could not remove pack archive {:?}: {}", archive_path, e);
        }

        // ── Stage 5: flatten overrides ──────────────────
        guard.ensure_active()?;
        for subdir in OVERRIDE_DIRS {
            if let Err(e) = flatten_overrides(&profile_dir, subdir).await {
                warn!("Override flattening failed for {:?}: {}", subdir, e);
                warnings.push(InstallWarning::OverrideFlatten(e.to_string()));
            }
        }

        // ── Stage 6: reconcile manifest ─────────────────
        // Registry-derived defaults; the manifest overrides them when present
        // because it reflects what the pack author actually shipped.
        guard.ensure_active()?;
        let mut game_version = resolved
            .version
            .game_versions
            .first()
            .cloned()
            .unwrap_or_default();
        let mut loader = resolved
            .version
            .loaders
            .first()
            .cloned()
            .unwrap_or_else(|| "vanilla".to_string());
        let mut loader_version = None;

        let manifest = match PackManifest::load(&profile_dir).await {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("Pack manifest unreadable, keeping registry versions: {}", e);
                warnings.push(InstallWarning::ManifestParse(e.to_string()));
                None
            }
        };

        if let Some(manifest) = &manifest {
            if let Some(pinned) = manifest.game_version() {
                game_version = pinned.to_string();
            }
            if let Some((name, version)) = manifest.loader() {
                loader = name.to_string();
                loader_version = Some(version.to_string());
            }
        }

        // ── Stage 7: download manifest files ────────────
        if let Some(manifest) = &manifest {
            self.download_manifest_files(&guard, manifest, &profile_dir, &mut warnings)
                .await?;
        }

        // ── Stage 8: persist ────────────────────────────
        guard.ensure_active()?;
        let mut record = ProfileRecord::new(dir_name, game_version, loader, profile_dir);
        record.loader_version = loader_version;
        record.source_project_id = Some(project.id.clone());
        record.source_version_id = Some(resolved.version.id.clone());

        if let Err(e) = self.profiles.save(&record).await {
            warn!("Could not write profile record: {}", e);
            warnings.push(InstallWarning::MetadataWrite(e.to_string()));
        }

        info!(
            "Installed pack '{}' ({} / {}) into {:?}",
            project.slug, record.game_version, record.loader, record.path
        );
        Ok(PackInstallReport { record, warnings })
    }

    /// Sequential, one file at a time: deterministic progress counter, and no
    /// burst of parallel requests against the same origin. Deliberate — do
    /// not parallelize without reconsidering the (i/n) progress contract.
    async fn download_manifest_files(
        &self,
        guard: &TaskGuard,
        manifest: &PackManifest,
        profile_dir: &Path,
        warnings: &mut Vec<InstallWarning>,
    ) -> InstallerResult<()> {
        let total = manifest.files.len();

        for (index, file) in manifest.files.iter().enumerate() {
            guard.ensure_active()?;

            let step = format!("Downloading Files ({}/{})", index + 1, total);
            let percent = ((index + 1) as f64 / total as f64) * 100.0;

            let Some(dest) = safe_join(profile_dir, &file.path) else {
                warn!("Skipping manifest file with unsafe path: {}", file.path);
                warnings.push(InstallWarning::FileSkipped {
                    path: file.path.clone(),
                    reason: "path escapes profile directory".to_string(),
                });
                continue;
            };
            let (dest_dir, file_name) = match (dest.parent(), dest.file_name()) {
                (Some(parent), Some(name)) => {
                    (parent.to_path_buf(), name.to_string_lossy().to_string())
                }
                _ => {
                    warnings.push(InstallWarning::FileSkipped {
                        path: file.path.clone(),
                        reason: "invalid file path".to_string(),
                    });
                    continue;
                }
            };

            // Mirrors are tried in order; the first completed transfer wins.
            let mut last_error: Option<InstallerError> = None;
            let mut completed = false;
            for url in &file.downloads {
                let download =
                    DownloadRequest::new(url.clone(), dest_dir.clone(), file_name.clone());
                match self
                    .download_with_progress(guard, &download, &step, Some(percent))
                    .await
                {
                    Ok(DownloadOutcome::Completed) => {
                        completed = true;
                        break;
                    }
                    Ok(DownloadOutcome::Stopped) => return Err(InstallerError::Cancelled),
                    Err(e) if e.is_cancellation() => return Err(e),
                    Err(e) => last_error = Some(e),
                }
            }

            if !completed {
                let reason = last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no download URL".to_string());
                warn!("Skipping manifest file {}: {}", file.path, reason);
                warnings.push(InstallWarning::FileSkipped {
                    path: file.path.clone(),
                    reason,
                });
            }
        }

        Ok(())
    }

    async fn download_with_progress(
        &self,
        guard: &TaskGuard,
        download: &DownloadRequest,
        step: &str,
        fixed_percent: Option<f64>,
    ) -> InstallerResult<DownloadOutcome> {
        let reporter = Arc::clone(&self.reporter);
        let project_id = guard.project_id().to_string();
        let step = step.to_string();

        let on_progress = move |tick: DownloadTick| {
            reporter.report(ProgressUpdate {
                project_id: project_id.clone(),
                step: step.clone(),
                percent: fixed_percent.unwrap_or_else(|| tick.percent()),
                bytes_done: tick.bytes_done,
                bytes_total: tick.bytes_total,
                rate: tick.rate,
            });
        };

        self.downloader
            .download(download, &on_progress, guard.token())
            .await
    }
}

/// Join a manifest-relative path onto the profile root, rejecting absolute
/// paths and `..` traversal.
fn safe_join(base: &Path, relative: &str) -> Option<PathBuf> {
    let rel = Path::new(relative);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    let joined = base.join(rel);
    if joined == base {
        return None;
    }
    Some(joined)
}

/// Move the contents of `<profile>/<subdir>` up into the profile root,
/// merging into and overwriting same-named entries, then remove the emptied
/// subdirectory. Best-effort; the caller logs failures and continues.
async fn flatten_overrides(profile_dir: &Path, subdir: &str) -> InstallerResult<()> {
    let source = profile_dir.join(subdir);
    if !source.is_dir() {
        return Ok(());
    }

    let profile_dir = profile_dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        merge_dir_recursive(&source, &profile_dir)?;
        std::fs::remove_dir_all(&source).map_err(|source_err| InstallerError::Io {
            path: source,
            source: source_err,
        })
    })
    .await
    .map_err(|e| InstallerError::Other(format!("flatten task panicked: {e}")))?
}

fn merge_dir_recursive(source: &Path, destination: &Path) -> InstallerResult<()> {
    for entry in std::fs::read_dir(source).map_err(|e| InstallerError::Io {
        path: source.to_path_buf(),
        source: e,
    })? {
        let entry = entry.map_err(|e| InstallerError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        let src_path = entry.path();
        let dst_path = destination.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| InstallerError::Io {
            path: src_path.clone(),
            source: e,
        })?;

        if file_type.is_dir() {
            std::fs::create_dir_all(&dst_path).map_err(|e| InstallerError::Io {
                path: dst_path.clone(),
                source: e,
            })?;
            merge_dir_recursive(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            if dst_path.exists() {
                std::fs::remove_file(&dst_path).map_err(|e| InstallerError::Io {
                    path: dst_path.clone(),
                    source: e,
                })?;
            }
            std::fs::copy(&src_path, &dst_path).map_err(|e| InstallerError::Io {
                path: dst_path.clone(),
                source: e,
            })?;
        }
    }

    Ok(())
}
