use crate::{
    storage::{KeyValueStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY},
    ClientError, ClientResult, TokenSet,
};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Current access and refresh tokens, written through to storage.
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    tokens: RwLock<Credentials>,
}

impl CredentialStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let tokens = Credentials {
            access_token: store.get(ACCESS_TOKEN_KEY),
            refresh_token: store.get(REFRESH_TOKEN_KEY),
        };
        Self {
            store,
            tokens: RwLock::new(tokens),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Credentials {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn get_access(&self) -> Option<String> {
        self.snapshot().access_token
    }

    #[must_use]
    pub fn get_refresh(&self) -> Option<String> {
        self.snapshot().refresh_token
    }

    /// Overwrite each token present in `partial`. Missing or empty tokens
    /// leave the stored value alone.
    pub fn apply_tokens(&self, partial: &TokenSet) {
        let mut guard = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        let tokens = &mut *guard;

        let updates = [
            (
                &partial.access_token,
                &mut tokens.access_token,
                ACCESS_TOKEN_KEY,
            ),
            (
                &partial.refresh_token,
                &mut tokens.refresh_token,
                REFRESH_TOKEN_KEY,
            ),
        ];
        for (incoming, slot, key) in updates {
            let Some(value) = incoming.as_deref().filter(|value| !value.is_empty()) else {
                continue;
            };
            *slot = Some(value.to_string());
            if let Err(err) = self.store.set(key, value) {
                tracing::warn!(key, "failed to persist token: {err}");
            }
        }
    }

    /// The trimmed access token, or `AuthenticationRequired` when there is
    /// none.
    pub fn require_access(&self) -> ClientResult<String> {
        self.get_access()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ClientError::AuthenticationRequired)
    }

    pub fn clear(&self) {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        *tokens = Credentials::default();

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(err) = self.store.remove(key) {
                tracing::warn!(key, "failed to remove token: {err}");
            }
        }
    }
}
