//! Ordered log of user/model turns, persisted across sessions.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub role: Role,
    pub content: String,
}

/// Append-only exchange history owned by the client.
///
/// Persisted wholesale by a [`crate::storage::HistoryStore`]; the serialized
/// form is the plain list of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeHistory {
    records: Vec<ExchangeRecord>,
}

impl ExchangeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.records.push(ExchangeRecord {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_model(&mut self, content: impl Into<String>) {
        self.records.push(ExchangeRecord {
            role: Role::Model,
            content: content.into(),
        });
    }

    pub fn records(&self) -> &[ExchangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_order() {
        let mut history = ExchangeHistory::new();
        history.push_user("open word");
        history.push_model("{\"command\":\"open_app\"}");
        history.push_user("thanks");

        let records = history.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].role, Role::User);
        assert_eq!(records[1].role, Role::Model);
        assert_eq!(records[2].content, "thanks");
    }

    #[test]
    fn serializes_as_bare_list() {
        let mut history = ExchangeHistory::new();
        history.push_user("hello");
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"role": "user", "content": "hello"}])
        );
    }

    #[test]
    fn serde_roundtrip_is_identity() {
        let mut history = ExchangeHistory::new();
        history.push_user("a");
        history.push_model("b");
        let json = serde_json::to_string(&history).unwrap();
        let loaded: ExchangeHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, history);
    }
}
