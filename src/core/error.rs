use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the install pipeline.
/// Every module returns `Result<T, InstallerError>`.
#[derive(Debug, Error)]
pub enum InstallerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Registry API error: {0}")]
    RegistryApi(String),

    // ── Resolution ──────────────────────────────────────
    #[error("No version of '{project}' is compatible with the requested profile")]
    NoCompatibleVersion { project: String },

    #[error("Version '{version}' has no downloadable file")]
    NoFileAvailable { version: String },

    // ── Tasks ───────────────────────────────────────────
    #[error("An install is already in progress for project '{0}'")]
    AlreadyInProgress(String),

    #[error("Install cancelled")]
    Cancelled,

    // ── Profiles ────────────────────────────────────────
    #[error("Version '{version_id}' of project '{project_id}' is already installed")]
    AlreadyInstalled {
        project_id: String,
        version_id: String,
    },

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive extraction failed: {0}")]
    ExtractionFailed(String),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pack manifest parse error: {0}")]
    ManifestParse(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type InstallerResult<T> = Result<T, InstallerError>;

impl InstallerError {
    /// Whether this failure was caused by a user-initiated abort.
    /// The presentation layer shows "cancelled" rather than "error" for these.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, InstallerError::Cancelled)
    }
}

impl From<std::io::Error> for InstallerError {
    fn from(source: std::io::Error) -> Self {
        InstallerError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
