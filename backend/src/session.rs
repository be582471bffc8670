//! In-memory generation sessions keyed by id.

use crate::pipeline::SessionContext;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Shared map of sessions. Handlers take a copy with [`SessionStore::get`],
/// run a pipeline step on it and write it back with [`SessionStore::put`].
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionContext>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session using `model` and return a copy of it.
    pub async fn create(&self, model: &str) -> SessionContext {
        let ctx = SessionContext::new(Uuid::new_v4().to_string(), model);
        self.sessions
            .write()
            .await
            .insert(ctx.id.clone(), ctx.clone());
        ctx
    }

    pub async fn get(&self, id: &str) -> Option<SessionContext> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn put(&self, ctx: SessionContext) {
        self.sessions.write().await.insert(ctx.id.clone(), ctx);
    }

    pub async fn remove(&self, id: &str) -> Option<SessionContext> {
        self.sessions.write().await.remove(id)
    }
}
