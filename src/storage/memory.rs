use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AgentError, AgentResult};
use crate::history::ExchangeHistory;
use crate::storage::traits::HistoryStore;

/// In-memory history store, used by tests and as a fallback when no data
/// directory is available.
pub struct MemoryHistoryStore {
    state: Mutex<ExchangeHistory>,
}

impl MemoryHistoryStore {
    pub fn new(history: ExchangeHistory) -> Self {
        Self {
            state: Mutex::new(history),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new(ExchangeHistory::default())
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> AgentResult<ExchangeHistory> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| AgentError::Storage("failed to lock history state".to_string()))
    }

    async fn save(&self, history: &ExchangeHistory) -> AgentResult<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| AgentError::Storage("failed to lock history state".to_string()))?;
        *guard = history.clone();
        Ok(())
    }
}
