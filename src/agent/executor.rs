//! Executes decoded command batches against the registry.

use crate::automation::Desktop;

use super::command::{CommandRegistry, Invocation};
use super::parser::{parse_reply, Reply};

/// What the presentation layer displays after processing one model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Joined `say` acknowledgments, or the raw reply text when no record
    /// carried one. Never empty for a non-empty reply.
    pub say: String,
    /// Joined handler result lines, in invocation order. Empty when no
    /// command ran.
    pub results: String,
}

/// Run a batch of invocations in order.
///
/// Unregistered command names are skipped: they never reach a handler and
/// produce no result line. Once a handler runs its side effect stands;
/// there is no rollback across the batch.
pub fn execute(
    registry: &CommandRegistry,
    desktop: &dyn Desktop,
    invocations: &[Invocation],
    fallback_text: &str,
) -> ExecutionOutcome {
    let mut says = Vec::new();
    let mut results = Vec::new();

    for invocation in invocations {
        let name = invocation.kind.name();
        let Some(command) = registry.lookup(name) else {
            tracing::debug!("skipping unregistered command {name:?}");
            continue;
        };
        tracing::info!("executing command {name}");
        let result = (command.handler)(&invocation.kind, desktop);
        if let Some(say) = &invocation.say {
            says.push(say.clone());
        }
        results.push(result);
    }

    let say = if says.is_empty() {
        fallback_text.to_string()
    } else {
        says.join("\n")
    };
    ExecutionOutcome {
        say,
        results: results.join("\n"),
    }
}

/// Parse a raw model reply and execute whatever commands it contains.
///
/// Plain chat text comes back as the `say` output with no results.
pub fn run_reply(
    registry: &CommandRegistry,
    desktop: &dyn Desktop,
    text: &str,
) -> ExecutionOutcome {
    match parse_reply(text) {
        Reply::Chat(chat) => ExecutionOutcome {
            say: chat,
            results: String::new(),
        },
        Reply::Commands(invocations) => execute(registry, desktop, &invocations, text.trim()),
    }
}
