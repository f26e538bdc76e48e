//! Thin client for the Gemini `generateContent` REST API.

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{AgentError, AgentResult};
use crate::history::{ExchangeHistory, Role};
use crate::storage::SharedHistoryStore;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// The full exchange history as request contents, under the fixed system
/// instruction.
fn build_request(instruction: &str, history: &ExchangeHistory) -> GenerateRequest {
    GenerateRequest {
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: instruction.to_string(),
            }],
        },
        contents: history
            .records()
            .iter()
            .map(|record| Content {
                role: match record.role {
                    Role::User => "user",
                    Role::Model => "model",
                },
                parts: vec![Part {
                    text: record.content.clone(),
                }],
            })
            .collect(),
    }
}

/// Remote text client.
///
/// Owns the exchange history: the user turn is appended before the call and
/// the model turn after a successful one, so a failed call leaves the user
/// turn in place but adds no reply.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    instruction: String,
    history: ExchangeHistory,
    store: SharedHistoryStore,
}

impl GeminiClient {
    /// Construct the client, loading whatever history the store has. A
    /// load failure starts the session with an empty history.
    pub async fn new(settings: &Settings, instruction: String, store: SharedHistoryStore) -> Self {
        let history = match store.load().await {
            Ok(history) => history,
            Err(error) => {
                tracing::warn!("failed to load exchange history: {error}; starting empty");
                ExchangeHistory::default()
            }
        };
        tracing::info!(
            "client ready: model={} history_turns={}",
            settings.model,
            history.len()
        );
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            instruction,
            history,
            store,
        }
    }

    /// Send `prompt` and return the model's reply text.
    pub async fn generate(&mut self, prompt: &str) -> AgentResult<String> {
        self.history.push_user(prompt);
        let body = build_request(&self.instruction, &self.history);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|error| AgentError::Remote(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgentError::Remote(format!(
                "{status}: {}",
                detail.trim()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|error| AgentError::Remote(format!("invalid response body: {error}")))?;
        let reply = parsed
            .first_text()
            .ok_or_else(|| AgentError::Remote("response had no candidate text".to_string()))?
            .trim()
            .to_string();

        self.history.push_model(&reply);
        Ok(reply)
    }

    /// Persist the history wholesale.
    pub async fn save_history(&self) -> AgentResult<()> {
        self.store.save(&self.history).await
    }

    pub fn history(&self) -> &ExchangeHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_maps_history_to_contents() {
        let mut history = ExchangeHistory::new();
        history.push_user("open word");
        history.push_model("{\"command\":\"open_app\"}");

        let body = build_request("be helpful", &history);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "be helpful"
        );
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "open word");
        assert_eq!(json["contents"][1]["role"], "model");
    }

    #[test]
    fn response_text_joins_candidate_parts() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello"},{"text":" there"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("Hello there"));
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(parsed.first_text(), None);

        let parsed: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(parsed.first_text(), None);
    }
}
