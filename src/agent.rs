pub mod command;
pub mod executor;
pub mod handlers;
pub mod parser;

pub use command::{Command, CommandKind, CommandRegistry, Invocation};
pub use executor::{execute, run_reply, ExecutionOutcome};
pub use handlers::{default_registry, is_failure, registry_with_pacing, Pacing, FAILURE_MARKER};
pub use parser::{parse_free_text, parse_reply, FreeTextArgs, Reply};
