use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::UserId;
use crate::wizard::stage::WizardStage;

/// One in-progress guided entry. Transient: lives only until confirm,
/// cancel, replacement or expiry.
#[derive(Clone, Debug)]
pub struct WizardSession {
    pub stage: WizardStage,
    touched_at: Instant,
}

impl WizardSession {
    pub fn new(stage: WizardStage) -> Self {
        Self { stage, touched_at: Instant::now() }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        !ttl.is_zero() && self.touched_at.elapsed() > ttl
    }
}

/// Session-store capability owned by the wizard engine. Keyed by the
/// initiating user; at most one session per user.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user: UserId) -> Option<WizardSession>;
    async fn put(&self, user: UserId, session: WizardSession);
    async fn remove(&self, user: UserId);
    async fn active_count(&self) -> usize;
}

#[async_trait]
impl<S> SessionStore for std::sync::Arc<S>
where
    S: SessionStore,
{
    async fn get(&self, user: UserId) -> Option<WizardSession> {
        self.as_ref().get(user).await
    }

    async fn put(&self, user: UserId, session: WizardSession) {
        self.as_ref().put(user, session).await;
    }

    async fn remove(&self, user: UserId) {
        self.as_ref().remove(user).await;
    }

    async fn active_count(&self) -> usize {
        self.as_ref().active_count().await
    }
}

/// Process-local store with lazy TTL eviction: a session past its TTL is
/// dropped on the next access. A zero TTL disables expiry.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<i64, WizardSession>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), ttl }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(1800))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user: UserId) -> Option<WizardSession> {
        let expired = {
            let sessions = self.sessions.read().await;
            match sessions.get(&user.0) {
                Some(session) if session.is_expired(self.ttl) => true,
                Some(session) => return Some(session.clone()),
                None => return None,
            }
        };

        if expired {
            self.sessions.write().await.remove(&user.0);
        }
        None
    }

    async fn put(&self, user: UserId, session: WizardSession) {
        self.sessions.write().await.insert(user.0, session);
    }

    async fn remove(&self, user: UserId) {
        self.sessions.write().await.remove(&user.0);
    }

    async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
