// Shared fakes for the trait seams. Test-only.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::downloader::{
    ArtifactDownloader, DownloadOutcome, DownloadRequest, DownloadTick, ProgressFn,
};
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::registry::{
    CategoryTag, FileHashes, GameVersionTag, LoaderTag, Project, ProjectType, RegistryClient,
    SearchQuery, SearchResults, Version, VersionFile, VersionFilter,
};
use crate::core::tasks::InstallTaskRegistry;

pub fn fake_project(id: &str, slug: &str) -> Project {
    Project {
        id: id.to_string(),
        slug: slug.to_string(),
        title: slug.to_string(),
        author: "tester".to_string(),
        project_type: ProjectType::Mod,
        categories: Vec::new(),
        loaders: Vec::new(),
        downloads: 0,
        icon_url: None,
    }
}

/// A version with a single primary file at `https://cdn.example.com/<id>.jar`.
pub fn fake_version(id: &str, project_id: &str, game_versions: &[&str], loaders: &[&str]) -> Version {
    Version {
        id: id.to_string(),
        project_id: project_id.to_string(),
        name: id.to_string(),
        version_number: id.to_string(),
        game_versions: game_versions.iter().map(|s| s.to_string()).collect(),
        loaders: loaders.iter().map(|s| s.to_string()).collect(),
        files: vec![VersionFile {
            url: format!("https://cdn.example.com/{}.jar", id),
            filename: format!("{}.jar", id),
            primary: true,
            size: 1024,
            hashes: FileHashes::default(),
        }],
        dependencies: Vec::new(),
        date_published: String::new(),
        version_type: "release".to_string(),
    }
}

/// In-memory registry. Versions are returned in insertion order, mirroring
/// the real registry's newest-first contract.
#[derive(Default)]
pub struct FakeRegistry {
    versions: Vec<Version>,
    cancel_on_query: Option<String>,
    tasks: Option<Arc<InstallTaskRegistry>>,
}

impl FakeRegistry {
    pub fn add_version(&mut self, version: Version) {
        self.versions.push(version);
    }

    /// Cancel the named project's task as soon as any version query runs,
    /// simulating a user cancel racing the resolve step.
    pub fn cancel_on_query(&mut self, project_id: &str) {
        self.cancel_on_query = Some(project_id.to_string());
    }

    pub fn attach_tasks(&mut self, tasks: Arc<InstallTaskRegistry>) {
        self.tasks = Some(tasks);
    }

    fn fire_cancel(&self) {
        if let (Some(project_id), Some(tasks)) = (&self.cancel_on_query, &self.tasks) {
            tasks.cancel(project_id);
        }
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn search_projects(&self, _query: &SearchQuery) -> InstallerResult<SearchResults> {
        Ok(SearchResults {
            hits: Vec::new(),
            offset: 0,
            limit: 0,
            total_hits: 0,
        })
    }

    async fn get_project(&self, id: &str) -> InstallerResult<Project> {
        Ok(fake_project(id, id))
    }

    async fn get_projects(&self, ids: &[String]) -> InstallerResult<Vec<Project>> {
        Ok(ids.iter().map(|id| fake_project(id, id)).collect())
    }

    async fn get_versions(
        &self,
        project_id: &str,
        filter: &VersionFilter,
    ) -> InstallerResult<Vec<Version>> {
        self.fire_cancel();
        Ok(self
            .versions
            .iter()
            .filter(|v| v.project_id == project_id)
            .filter(|v| {
                filter.loaders.is_empty() || v.loaders.iter().any(|l| filter.loaders.contains(l))
            })
            .filter(|v| {
                filter.game_versions.is_empty()
                    || v.game_versions.iter().any(|g| filter.game_versions.contains(g))
            })
            .cloned()
            .collect())
    }

    async fn get_version(&self, id: &str) -> InstallerResult<Version> {
        self.fire_cancel();
        self.versions
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| InstallerError::RegistryApi(format!("unknown version {}", id)))
    }

    async fn get_versions_by_id(&self, ids: &[String]) -> InstallerResult<Vec<Version>> {
        Ok(self
            .versions
            .iter()
            .filter(|v| ids.contains(&v.id))
            .cloned()
            .collect())
    }

    async fn get_categories(&self) -> InstallerResult<Vec<CategoryTag>> {
        Ok(Vec::new())
    }

    async fn get_game_versions(&self) -> InstallerResult<Vec<GameVersionTag>> {
        Ok(Vec::new())
    }

    async fn get_loaders(&self) -> InstallerResult<Vec<LoaderTag>> {
        Ok(Vec::new())
    }
}

/// Downloader that writes stubbed bytes to the destination path.
#[derive(Default)]
pub struct FakeDownloader {
    stubs: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
    stopping: Mutex<HashSet<String>>,
    completed: AtomicUsize,
    /// Cancel the caller's token after this many completed downloads.
    cancel_after: Mutex<Option<usize>>,
    log: Mutex<Vec<String>>,
}

impl FakeDownloader {
    pub fn stub(&self, url: &str, bytes: Vec<u8>) {
        self.stubs.lock().unwrap().insert(url.to_string(), bytes);
    }

    /// Make this URL fail with `DownloadFailed`.
    pub fn fail_url(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    /// Make this URL report an explicit stop, as if aborted mid-flight.
    pub fn stop_url(&self, url: &str) {
        self.stopping.lock().unwrap().insert(url.to_string());
    }

    /// Fire the caller's cancellation token once `n` downloads completed,
    /// simulating a user cancel between sequential file downloads.
    pub fn cancel_after(&self, n: usize) {
        *self.cancel_after.lock().unwrap() = Some(n);
    }

    /// URLs downloaded so far, in order.
    pub fn downloaded_urls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactDownloader for FakeDownloader {
    async fn download(
        &self,
        request: &DownloadRequest,
        on_progress: ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> InstallerResult<DownloadOutcome> {
        if cancel.is_cancelled() {
            return Ok(DownloadOutcome::Stopped);
        }
        if self.stopping.lock().unwrap().contains(&request.url) {
            return Ok(DownloadOutcome::Stopped);
        }
        if self.failing.lock().unwrap().contains(&request.url) {
            return Err(InstallerError::DownloadFailed {
                url: request.url.clone(),
                reason: "stubbed failure".to_string(),
            });
        }

        let bytes = self
            .stubs
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| b"stub".to_vec());

        tokio::fs::create_dir_all(&request.dest_dir)
            .await
            .map_err(|source| InstallerError::Io {
                path: request.dest_dir.clone(),
                source,
            })?;
        tokio::fs::write(request.dest_path(), &bytes)
            .await
            .map_err(|source| InstallerError::Io {
                path: request.dest_path(),
                source,
            })?;

        on_progress(DownloadTick {
            bytes_done: bytes.len() as u64,
            bytes_total: Some(bytes.len() as u64),
            rate: 0.0,
        });

        self.log.lock().unwrap().push(request.url.clone());
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(limit) = *self.cancel_after.lock().unwrap() {
            if done >= limit {
                cancel.cancel();
            }
        }

        Ok(DownloadOutcome::Completed)
    }
}
