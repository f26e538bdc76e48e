//! Command model and registry.
//!
//! Arguments are a tagged variant per command, decoded once at the parser
//! boundary; handlers never see a raw argument map. Missing string fields
//! decode as empty so a handler can report them in its result string
//! instead of the record being dropped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::automation::Desktop;

/// A decoded command name plus its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args")]
pub enum CommandKind {
    #[serde(rename = "open_app")]
    OpenApp {
        #[serde(default)]
        app: String,
    },
    #[serde(rename = "new_document")]
    NewDocument {
        #[serde(default)]
        app: String,
    },
    #[serde(rename = "type")]
    Type {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "save_file")]
    SaveFile {
        #[serde(default)]
        filename: String,
    },
    #[serde(rename = "open_type_save")]
    OpenTypeSave {
        #[serde(default)]
        app: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        filename: String,
        /// Raw natural-language instruction; when present the handler
        /// derives `app`/`text`/`filename` from it instead.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command_text: Option<String>,
    },
    #[serde(rename = "open_url")]
    OpenUrl {
        #[serde(default)]
        url: String,
    },
}

impl CommandKind {
    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::OpenApp { .. } => "open_app",
            CommandKind::NewDocument { .. } => "new_document",
            CommandKind::Type { .. } => "type",
            CommandKind::SaveFile { .. } => "save_file",
            CommandKind::OpenTypeSave { .. } => "open_type_save",
            CommandKind::OpenUrl { .. } => "open_url",
        }
    }
}

/// One decoded command record from model output, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub kind: CommandKind,
    /// Optional human-facing acknowledgment accompanying the command.
    pub say: Option<String>,
}

/// Handler invoked with the decoded arguments and the automation seam.
/// Returns a single human-readable status string; failures carry the
/// [`crate::agent::handlers::FAILURE_MARKER`] prefix.
pub type CommandHandler = Box<dyn Fn(&CommandKind, &dyn Desktop) -> String + Send + Sync>;

/// A registered automation command.
pub struct Command {
    pub name: String,
    pub description: String,
    /// Argument names and their expected types, as shown to the model.
    pub schema: Value,
    pub handler: CommandHandler,
}

/// Lookup structure mapping command names to their definitions.
///
/// Built once at start-up, single-threaded, then read-only; it is passed by
/// reference to the executor rather than living in ambient global state.
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Insert or overwrite the entry for `command.name`. Last write wins.
    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Sorted list of registered command names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
