pub mod agent;
pub mod app;
pub mod automation;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod logging;
pub mod storage;

pub use crate::config::Settings;
pub use crate::error::{AgentError, AgentResult};
