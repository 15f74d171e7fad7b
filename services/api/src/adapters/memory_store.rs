//! services/api/src/adapters/memory_store.rs
//!
//! An in-memory implementation of the `SessionStore` port. This is the
//! degraded-mode/default store used whenever no database is configured,
//! mirroring the service's "keep working without persistence" policy.

use async_trait::async_trait;
use interview_core::domain::Session;
use interview_core::ports::{PortError, PortResult, SessionStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A `SessionStore` backed by a process-local map. Sessions do not survive a
/// restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: Session) -> PortResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn load(&self, token: &str) -> PortResult<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("session {token}")))
    }

    async fn save(&self, session: &Session) -> PortResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, token: &str) -> PortResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        Ok(())
    }

    async fn list(&self) -> PortResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut all: Vec<Session> = sessions.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn round_trips_a_session() {
        let store = MemorySessionStore::new();
        let session = Session::new("tok".to_string(), Utc::now());
        store.create(session).await.unwrap();

        let mut loaded = store.load("tok").await.unwrap();
        assert_eq!(loaded.token, "tok");
        assert!(!loaded.completed);

        loaded.completed = true;
        store.save(&loaded).await.unwrap();
        assert!(store.load("tok").await.unwrap().completed);

        store.delete("tok").await.unwrap();
        assert!(matches!(
            store.load("tok").await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn lists_in_creation_order() {
        let store = MemorySessionStore::new();
        let first = Session::new("a".to_string(), Utc::now() - chrono::Duration::minutes(5));
        let second = Session::new("b".to_string(), Utc::now());
        store.create(second).await.unwrap();
        store.create(first).await.unwrap();
        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].token, "a");
    }
}
