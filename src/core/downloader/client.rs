use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ArtifactDownloader, DownloadOutcome, DownloadRequest, DownloadTick, ProgressFn};
use crate::core::error::{InstallerError, InstallerResult};

/// Progress ticks are throttled so a fast transfer does not flood the sink.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Streaming HTTP downloader.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactDownloader for HttpDownloader {
    async fn download(
        &self,
        request: &DownloadRequest,
        on_progress: ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> InstallerResult<DownloadOutcome> {
        if cancel.is_cancelled() {
            return Ok(DownloadOutcome::Stopped);
        }

        let dest = request.dest_path();

        tokio::fs::create_dir_all(&request.dest_dir)
            .await
            .map_err(|source| InstallerError::Io {
                path: request.dest_dir.clone(),
                source,
            })?;

        if !request.overwrite && dest.exists() {
            debug!("Skipping existing file {:?}", dest);
            return Ok(DownloadOutcome::Completed);
        }

        let response = self.client.get(&request.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallerError::DownloadFailed {
                url: request.url.clone(),
                reason: format!("HTTP {}", status),
            });
        }

        let bytes_total = response.content_length();
        let mut stream = response.bytes_stream();

        let mut file = tokio::fs::File::create(&dest)
            .await
            .map_err(|source| InstallerError::Io {
                path: dest.clone(),
                source,
            })?;

        let mut hasher = request.expected_sha1.as_ref().map(|_| Sha1::new());
        let mut bytes_done: u64 = 0;
        let started = Instant::now();
        let mut last_tick = Instant::now();

        loop {
            // Cancellation is observed between chunks; the partial file stays
            // on disk (the next install for this target overwrites it).
            let chunk = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Download of {} stopped by cancellation", request.url);
                    return Ok(DownloadOutcome::Stopped);
                }
                chunk = stream.next() => chunk,
            };

            let Some(chunk) = chunk else { break };
            let chunk = chunk?;

            file.write_all(&chunk)
                .await
                .map_err(|source| InstallerError::Io {
                    path: dest.clone(),
                    source,
                })?;

            if let Some(hasher) = hasher.as_mut() {
                hasher.update(&chunk);
            }

            bytes_done += chunk.len() as u64;

            let now = Instant::now();
            if now.duration_since(last_tick) >= PROGRESS_INTERVAL {
                last_tick = now;
                on_progress(DownloadTick {
                    bytes_done,
                    bytes_total,
                    rate: transfer_rate(bytes_done, started.elapsed()),
                });
            }
        }

        file.flush().await.map_err(|source| InstallerError::Io {
            path: dest.clone(),
            source,
        })?;
        // Drop the handle before validation; keeping it open breaks renames
        // and deletes on Windows.
        drop(file);

        if let (Some(hasher), Some(expected)) = (hasher, request.expected_sha1.as_deref()) {
            let actual = hex::encode(hasher.finalize());
            if actual != expected {
                return Err(InstallerError::Sha1Mismatch {
                    path: dest.clone(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        on_progress(DownloadTick {
            bytes_done,
            bytes_total: bytes_total.or(Some(bytes_done)),
            rate: transfer_rate(bytes_done, started.elapsed()),
        });

        debug!("Downloaded {} -> {:?} ({} bytes)", request.url, dest, bytes_done);
        Ok(DownloadOutcome::Completed)
    }
}

fn transfer_rate(bytes_done: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        bytes_done as f64 / secs
    } else {
        0.0
    }
}
