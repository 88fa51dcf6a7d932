use crate::storage::{KeyValueStore, API_BASE_KEY};
use std::sync::{Arc, PoisonError, RwLock};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Holds the endpoint base every request target is resolved against.
pub struct ConfigStore {
    store: Arc<dyn KeyValueStore>,
    base: RwLock<String>,
}

impl ConfigStore {
    /// Load the persisted base, or fall back to `default_base` on first run.
    pub fn load(store: Arc<dyn KeyValueStore>, default_base: &str) -> Self {
        let base = store
            .get(API_BASE_KEY)
            .filter(|base| !base.trim().is_empty())
            .unwrap_or_else(|| default_base.to_string());

        Self {
            store,
            base: RwLock::new(base),
        }
    }

    #[must_use]
    pub fn get_base(&self) -> String {
        self.base
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Trim and store `candidate`. A blank candidate keeps the previous
    /// base. Returns the effective base.
    pub fn set_base(&self, candidate: &str) -> String {
        let mut base = self.base.write().unwrap_or_else(PoisonError::into_inner);
        let candidate = candidate.trim();
        if !candidate.is_empty() {
            candidate.clone_into(&mut base);
        }

        if let Err(err) = self.store.set(API_BASE_KEY, &base) {
            tracing::warn!("failed to persist api base: {err}");
        }
        base.clone()
    }
}
