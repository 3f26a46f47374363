// ─── Install Task Registry ───
// At most one in-flight, cancellable task per project id. A second request for
// the same id is rejected outright, never queued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::error::{InstallerError, InstallerResult};

/// Registry of active installs, keyed by project id. Created once and passed
/// to the installers; not a process-wide singleton, so tests can run several
/// registries independently.
#[derive(Default)]
pub struct InstallTaskRegistry {
    tasks: Mutex<HashMap<String, CancellationToken>>,
}

impl InstallTaskRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a task for `project_id`. Fails with `AlreadyInProgress` if one
    /// is active — this is the pipeline's mutual-exclusion guarantee.
    ///
    /// The returned guard removes the task when dropped, so every exit path of
    /// the owning installer (success, error, cancellation) releases the id.
    pub fn begin(self: &Arc<Self>, project_id: &str) -> InstallerResult<TaskGuard> {
        let token = CancellationToken::new();
        {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            if tasks.contains_key(project_id) {
                return Err(InstallerError::AlreadyInProgress(project_id.to_string()));
            }
            tasks.insert(project_id.to_string(), token.clone());
        }
        debug!("Began install task for '{}'", project_id);

        Ok(TaskGuard {
            registry: Arc::clone(self),
            project_id: project_id.to_string(),
            token,
        })
    }

    /// Cancellation token of the active task, if any.
    pub fn get(&self, project_id: &str) -> Option<CancellationToken> {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.get(project_id).cloned()
    }

    /// Cancel the active task for `project_id`. The flag takes effect at the
    /// next check point of the owning installer; an attached download observes
    /// the same token and aborts its transfer. Returns false if no task exists.
    pub fn cancel(&self, project_id: &str) -> bool {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        match tasks.get(project_id) {
            Some(token) => {
                token.cancel();
                info!("Cancelled install task for '{}'", project_id);
                true
            }
            None => {
                warn!("Cancel requested for '{}' but no task is active", project_id);
                false
            }
        }
    }

    /// Unconditionally remove the task for `project_id`.
    pub fn end(&self, project_id: &str) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if tasks.remove(project_id).is_some() {
            debug!("Ended install task for '{}'", project_id);
        }
    }

    /// Project ids with an active task.
    pub fn active(&self) -> Vec<String> {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.keys().cloned().collect()
    }
}

/// Live handle to a registered task. Dropping it ends the task.
pub struct TaskGuard {
    registry: Arc<InstallTaskRegistry>,
    project_id: String,
    token: CancellationToken,
}

impl TaskGuard {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fails with `Cancelled` once the task's flag has been set. Installers
    /// call this before each stage transition.
    pub fn ensure_active(&self) -> InstallerResult<()> {
        if self.token.is_cancelled() {
            Err(InstallerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.registry.end(&self.project_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_for_same_id_is_rejected() {
        let registry = InstallTaskRegistry::new();
        let _guard = registry.begin("sodium").unwrap();

        match registry.begin("sodium") {
            Err(InstallerError::AlreadyInProgress(id)) => assert_eq!(id, "sodium"),
            other => panic!("expected AlreadyInProgress, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn different_ids_proceed_independently() {
        let registry = InstallTaskRegistry::new();
        let _a = registry.begin("sodium").unwrap();
        let _b = registry.begin("lithium").unwrap();
        assert_eq!(registry.active().len(), 2);
    }

    #[test]
    fn dropping_guard_frees_the_id() {
        let registry = InstallTaskRegistry::new();
        let guard = registry.begin("sodium").unwrap();
        drop(guard);
        assert!(registry.begin("sodium").is_ok());
    }

    #[test]
    fn cancel_sets_flag_and_reports_missing_tasks() {
        let registry = InstallTaskRegistry::new();
        let guard = registry.begin("sodium").unwrap();

        assert!(registry.cancel("sodium"));
        assert!(guard.is_cancelled());
        assert!(guard.ensure_active().is_err());

        assert!(!registry.cancel("unknown"));
    }

    #[test]
    fn get_returns_live_token_then_none_after_end() {
        let registry = InstallTaskRegistry::new();
        let guard = registry.begin("sodium").unwrap();
        assert!(registry.get("sodium").is_some());
        drop(guard);
        assert!(registry.get("sodium").is_none());
    }
}
