//! Start-up settings sourced from the environment.

use std::env;
use std::path::PathBuf;

use crate::error::{AgentError, AgentResult};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DATA_DIR_NAME: &str = ".crow";

/// Resolved configuration. A missing API key is fatal before the REPL
/// starts; everything else has a default.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    /// File holding the persisted exchange history.
    pub history_path: PathBuf,
    /// Directory for rotated log files.
    pub log_dir: PathBuf,
}

impl Settings {
    pub fn load() -> AgentResult<Self> {
        let api_key = env::var("CROW_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                AgentError::Config(
                    "missing API key: set CROW_API_KEY or GEMINI_API_KEY (a .env file works)"
                        .to_string(),
                )
            })?;
        let model = env::var("CROW_MODEL")
            .or_else(|_| env::var("GEMINI_MODEL"))
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let data_dir = env::var("CROW_DATA_DIR")
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            api_key,
            model,
            history_path: data_dir.join("history.json"),
            log_dir: data_dir.join("logs"),
        })
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_data_dir_is_under_home() {
        let dir = default_data_dir();
        assert!(dir.ends_with(DATA_DIR_NAME));
    }
}
