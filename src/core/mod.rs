// ─── Modweaver Core ───
// Content-acquisition and installation pipeline for a desktop game launcher.
//
// Architecture:
//   core/
//     registry/   — Remote content registry client (projects, versions, tags)
//     resolver/   — Picks one (Version, File) pair for a runtime profile
//     downloader/ — Cancellable single-file downloads with progress
//     archive/    — Zip listing + extraction
//     tasks/      — One in-flight, cancellable task per project id
//     install/    — Mod + modpack install orchestration
//     profile/    — ProfileRecord model + on-disk store
//     progress/   — Progress sink consumed by the presentation layer

pub mod archive;
pub mod downloader;
pub mod error;
pub mod http;
pub mod install;
pub mod profile;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod tasks;

#[cfg(test)]
pub mod testutil;
