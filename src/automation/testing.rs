//! Scripted desktop double for handler and executor tests.

use std::sync::Mutex;

use crate::automation::desktop::Desktop;
use crate::error::AgentResult;

/// Records every primitive call and reports a fixed set of window titles.
pub(crate) struct MockDesktop {
    titles: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl MockDesktop {
    pub(crate) fn with_titles(titles: &[&str]) -> Self {
        Self {
            titles: titles.iter().map(|t| t.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Desktop for MockDesktop {
    fn launch(&self, program: &str, _args: &[&str]) -> AgentResult<()> {
        self.record(format!("launch {program}"));
        Ok(())
    }

    fn window_titles(&self) -> AgentResult<Vec<String>> {
        Ok(self.titles.clone())
    }

    fn focus_window(&self, partial: &str) -> AgentResult<bool> {
        let needle = partial.to_lowercase();
        for title in &self.titles {
            if title.to_lowercase().contains(&needle) {
                self.record(format!("focus {title}"));
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn type_text(&self, text: &str) -> AgentResult<()> {
        self.record(format!("type {text}"));
        Ok(())
    }

    fn send_key(&self, chord: &str) -> AgentResult<()> {
        self.record(format!("key {chord}"));
        Ok(())
    }

    fn open_url(&self, url: &str) -> AgentResult<()> {
        self.record(format!("url {url}"));
        Ok(())
    }
}
