// ─── Install Orchestration ───
// ContentInstaller drops one mod file into a content directory; PackInstaller
// runs the multi-stage modpack state machine. InstallService wires both to
// concrete collaborators and is what the presentation layer talks to.

mod content;
mod manifest;
mod pack;
mod service;

pub use content::{ContentInstallRequest, ContentInstaller};
pub use manifest::{PackManifest, PackManifestFile, PACK_MANIFEST_NAME};
pub use pack::{InstallWarning, PackInstallReport, PackInstallRequest, PackInstaller};
pub use service::{default_data_dir, InstallService};
