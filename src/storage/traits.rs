use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentResult;
use crate::history::ExchangeHistory;

/// Persistence seam for the exchange history.
///
/// The history is always read and written wholesale; there is no partial
/// update operation.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self) -> AgentResult<ExchangeHistory>;
    async fn save(&self, history: &ExchangeHistory) -> AgentResult<()>;
}

pub type SharedHistoryStore = Arc<dyn HistoryStore>;
