use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{AgentError, AgentResult};
use crate::history::ExchangeHistory;
use crate::storage::traits::HistoryStore;

/// File-backed history store.
///
/// The whole history is one JSON file, overwritten on every save. Load
/// never fails: a missing, unreadable, or unparsable file resets the
/// history to empty.
#[derive(Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self) -> AgentResult<ExchangeHistory> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ExchangeHistory::default());
            }
            Err(error) => {
                tracing::warn!(
                    "failed to read history file {}: {error}; starting empty",
                    self.path.display()
                );
                return Ok(ExchangeHistory::default());
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(history) => Ok(history),
            Err(error) => {
                tracing::warn!(
                    "failed to parse history file {}: {error}; starting empty",
                    self.path.display()
                );
                Ok(ExchangeHistory::default())
            }
        }
    }

    async fn save(&self, history: &ExchangeHistory) -> AgentResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AgentError::Storage(format!(
                    "failed to create history directory {}: {error}",
                    parent.display()
                ))
            })?;
        }
        let serialized = serde_json::to_vec_pretty(history)
            .map_err(|error| AgentError::Storage(format!("history serialize error: {error}")))?;
        tokio::fs::write(&self.path, serialized)
            .await
            .map_err(|error| {
                AgentError::Storage(format!(
                    "failed to write history file {}: {error}",
                    self.path.display()
                ))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempdir().expect("tempdir");
        let store = FileHistoryStore::new(dir.path().join("history.json"));

        let mut history = ExchangeHistory::new();
        history.push_user("open word and type hello");
        history.push_model("[{\"command\":\"open_app\"}]");

        store.save(&history).await.expect("save");
        let loaded = store.load().await.expect("load");
        assert_eq!(loaded, history);
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempdir().expect("tempdir");
        let store = FileHistoryStore::new(dir.path().join("missing.json"));
        let loaded = store.load().await.expect("load");
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, b"not json {").await.expect("write");

        let store = FileHistoryStore::new(path);
        let loaded = store.load().await.expect("load");
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempdir().expect("tempdir");
        let store = FileHistoryStore::new(dir.path().join("nested").join("history.json"));
        store
            .save(&ExchangeHistory::default())
            .await
            .expect("save");
        let loaded = store.load().await.expect("load");
        assert!(loaded.is_empty());
    }
}
