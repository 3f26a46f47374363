pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::downloader::{
    ArtifactDownloader, DownloadOutcome, DownloadRequest, DownloadTick, HttpDownloader,
};
pub use crate::core::error::{InstallerError, InstallerResult};
pub use crate::core::install::{
    default_data_dir, ContentInstallRequest, ContentInstaller, InstallService, InstallWarning,
    PackInstallReport, PackInstallRequest, PackInstaller, PackManifest, PACK_MANIFEST_NAME,
};
pub use crate::core::profile::{ProfileRecord, ProfileStore};
pub use crate::core::progress::{ChannelReporter, NullReporter, ProgressReporter, ProgressUpdate};
pub use crate::core::registry::{
    HttpRegistry, Project, ProjectType, RegistryClient, SearchQuery, SearchResults, Version,
    VersionFile, VersionFilter,
};
pub use crate::core::resolver::{Resolved, VersionConstraints, VersionResolver};
pub use crate::core::tasks::{InstallTaskRegistry, TaskGuard};

/// Initialize structured logging. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,modweaver=debug")),
        )
        .init();
}
