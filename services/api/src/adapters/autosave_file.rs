//! services/api/src/adapters/autosave_file.rs
//!
//! File-backed implementation of the `AutosaveStore` port, used by the
//! terminal runner. Snapshots older than the autosave TTL are treated as
//! absent and removed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interview_core::domain::AutosaveSnapshot;
use interview_core::ports::{AutosaveStore, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    token: String,
    question_id: String,
    draft: String,
    saved_at: DateTime<Utc>,
}

pub struct FileAutosaveStore {
    path: PathBuf,
}

impl FileAutosaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AutosaveStore for FileAutosaveStore {
    async fn save(&self, snapshot: &AutosaveSnapshot) -> PortResult<()> {
        let record = SnapshotFile {
            token: snapshot.token.clone(),
            question_id: snapshot.question_id.clone(),
            draft: snapshot.draft.clone(),
            saved_at: snapshot.saved_at,
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| PortError::Unexpected(format!("encode autosave: {e}")))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PortError::Unexpected(format!("write autosave: {e}")))?;
        Ok(())
    }

    async fn load(&self) -> PortResult<Option<AutosaveSnapshot>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Unexpected(format!("read autosave: {e}"))),
        };
        let record: SnapshotFile = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                // A corrupt snapshot is not worth failing over.
                debug!("discarding corrupt autosave file: {e}");
                return Ok(None);
            }
        };
        let snapshot = AutosaveSnapshot {
            token: record.token,
            question_id: record.question_id,
            draft: record.draft,
            saved_at: record.saved_at,
        };
        if snapshot.is_expired(Utc::now()) {
            let _ = tokio::fs::remove_file(&self.path).await;
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    async fn clear(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(format!("clear autosave: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot(saved_at: DateTime<Utc>) -> AutosaveSnapshot {
        AutosaveSnapshot {
            token: "tok".to_string(),
            question_id: "q_3".to_string(),
            draft: "half an answer".to_string(),
            saved_at,
        }
    }

    #[tokio::test]
    async fn round_trips_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAutosaveStore::new(dir.path().join("autosave.json"));

        assert!(store.load().await.unwrap().is_none());
        store.save(&snapshot(Utc::now())).await.unwrap();

        let loaded = store.load().await.unwrap().expect("snapshot present");
        assert_eq!(loaded.question_id, "q_3");
        assert_eq!(loaded.draft, "half an answer");

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_snapshots_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAutosaveStore::new(dir.path().join("autosave.json"));
        store
            .save(&snapshot(Utc::now() - Duration::hours(25)))
            .await
            .unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clearing_a_missing_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAutosaveStore::new(dir.path().join("autosave.json"));
        store.clear().await.unwrap();
    }
}
