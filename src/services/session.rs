//! Per-client session bindings.
//!
//! A session holds at most one reference to a processed artifact, keyed by
//! an opaque token the client carries in a cookie. This is an in-process
//! map, not a durable store: bindings do not survive a restart, and no
//! invariant ties a binding's liveness to the artifact still existing on
//! disk.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

/// What a session knows about its currently-active artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionBinding {
    /// `<token>_<sanitized name>` identifier of the bound artifact.
    pub unique_filename: String,
    /// Sanitized original filename, kept for display.
    pub original_filename: String,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionBinding>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an artifact to a session, replacing any existing binding
    /// unconditionally (last upload wins).
    pub async fn bind(&self, token: &str, binding: SessionBinding) {
        self.inner.lock().await.insert(token.to_string(), binding);
    }

    /// Remove a session's binding. Clearing an empty session is a no-op.
    pub async fn clear(&self, token: &str) {
        self.inner.lock().await.remove(token);
    }

    /// Look up the artifact currently bound to a session, if any.
    pub async fn current(&self, token: &str) -> Option<SessionBinding> {
        self.inner.lock().await.get(token).cloned()
    }
}
