// ─── Single-File Downloader ───
// Cancellable transfer of one URL to one destination path, with progress
// ticks. Three terminal outcomes: completed, stopped (cancel observed) or an
// error; installers map "stopped" to their Cancelled failure.

mod client;

pub use client::HttpDownloader;

use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::error::InstallerResult;

/// One file to fetch. `expected_sha1` is validated after the transfer when
/// set; the pack pipeline passes `None` since manifest hashes are advisory.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub dest_dir: PathBuf,
    pub file_name: String,
    pub overwrite: bool,
    pub expected_sha1: Option<String>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, dest_dir: PathBuf, file_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dest_dir,
            file_name: file_name.into(),
            overwrite: true,
            expected_sha1: None,
        }
    }

    pub fn dest_path(&self) -> PathBuf {
        self.dest_dir.join(&self.file_name)
    }
}

/// Progress tick emitted while a transfer is running.
#[derive(Debug, Clone, Copy)]
pub struct DownloadTick {
    pub bytes_done: u64,
    pub bytes_total: Option<u64>,
    /// Instantaneous rate in bytes per second.
    pub rate: f64,
}

impl DownloadTick {
    pub fn percent(&self) -> f64 {
        match self.bytes_total {
            Some(total) if total > 0 => (self.bytes_done as f64 / total as f64) * 100.0,
            _ => 0.0,
        }
    }
}

/// How a transfer ended when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed,
    /// The cancellation token fired mid-transfer. The partial destination
    /// file is left as-is; the next install overwrites it.
    Stopped,
}

pub type ProgressFn<'a> = &'a (dyn Fn(DownloadTick) + Send + Sync);

/// Downloader primitive the installers are built on.
#[async_trait]
pub trait ArtifactDownloader: Send + Sync {
    async fn download(
        &self,
        request: &DownloadRequest,
        on_progress: ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> InstallerResult<DownloadOutcome>;
}
