//! Worker-scoped context registry
//!
//! Maps each concurrent worker to its own session context. The registry is
//! the only way contexts are reached, which keeps the isolation guarantee
//! auditable: a context is created lazily for a worker, handed out only
//! through that worker's id, and removed at scenario end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use finweb_core::Edition;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::context::SessionContext;

/// Identity of one concurrent execution unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(pub u64);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Registry of per-worker session contexts
pub struct ContextRegistry {
    contexts: Mutex<HashMap<WorkerId, Arc<AsyncMutex<SessionContext>>>>,
    default_edition: Edition,
}

impl ContextRegistry {
    pub fn new(default_edition: Edition) -> Self {
        Self {
            contexts: Mutex::new(HashMap::new()),
            default_edition,
        }
    }

    /// The context of `worker`, created on first access.
    pub fn context_for(&self, worker: WorkerId) -> Arc<AsyncMutex<SessionContext>> {
        let mut contexts = self.contexts.lock().expect("context registry poisoned");
        contexts
            .entry(worker)
            .or_insert_with(|| {
                debug!(%worker, "session context created");
                Arc::new(AsyncMutex::new(SessionContext::new(self.default_edition)))
            })
            .clone()
    }

    /// Drop the worker's context entirely. The next access starts fresh.
    pub fn remove(&self, worker: WorkerId) {
        let mut contexts = self.contexts.lock().expect("context registry poisoned");
        if contexts.remove(&worker).is_some() {
            debug!(%worker, "session context removed");
        }
    }

    pub fn active_workers(&self) -> usize {
        self.contexts.lock().expect("context registry poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FlagKey;
    use finweb_core::ScenarioDescriptor;

    #[tokio::test]
    async fn test_contexts_are_isolated_between_workers() {
        let registry = ContextRegistry::new(Edition::Www);
        let a = registry.context_for(WorkerId(1));
        let b = registry.context_for(WorkerId(2));

        {
            let mut ctx_a = a.lock().await;
            ctx_a.put_scenario(ScenarioDescriptor::new("A", 1, vec![]));
            ctx_a.flags_mut().set(FlagKey::PrivacyConsentPopup);
            ctx_a.set_edition(Edition::De);
        }

        let ctx_b = b.lock().await;
        assert!(ctx_b.scenario().is_err());
        assert!(!ctx_b.flags().is_set(FlagKey::PrivacyConsentPopup));
        assert_eq!(ctx_b.edition(), Edition::Www);
    }

    #[tokio::test]
    async fn test_same_worker_gets_same_context() {
        let registry = ContextRegistry::new(Edition::Www);
        let first = registry.context_for(WorkerId(7));
        first
            .lock()
            .await
            .put_scenario(ScenarioDescriptor::new("A", 1, vec![]));

        let again = registry.context_for(WorkerId(7));
        assert!(again.lock().await.scenario().is_ok());
    }

    #[tokio::test]
    async fn test_removed_context_does_not_leak_into_next_scenario() {
        let registry = ContextRegistry::new(Edition::Www);
        registry
            .context_for(WorkerId(3))
            .lock()
            .await
            .flags_mut()
            .set(FlagKey::PrivacyConsentPopup);

        registry.remove(WorkerId(3));

        let fresh = registry.context_for(WorkerId(3));
        assert!(!fresh.lock().await.flags().is_set(FlagKey::PrivacyConsentPopup));
    }

    #[tokio::test]
    async fn test_concurrent_access_from_many_workers() {
        let registry = Arc::new(ContextRegistry::new(Edition::Www));
        let mut handles = Vec::new();

        for id in 0..16u64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let ctx = registry.context_for(WorkerId(id));
                let mut guard = ctx.lock().await;
                guard.put_scenario(ScenarioDescriptor::new(format!("S{}", id), id as u32, vec![]));
                guard.scenario().unwrap().line
            }));
        }

        for (id, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), id as u32);
        }
        assert_eq!(registry.active_workers(), 16);
    }
}
