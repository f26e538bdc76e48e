//! System instruction fixing the reply grammar the executor understands.

use std::fmt::Write;

use crate::agent::CommandRegistry;

/// Build the session system instruction from the live registry, so the
/// grammar advertised to the model always matches the registered commands.
pub fn system_instruction(registry: &CommandRegistry) -> String {
    let mut instruction = String::from(
        "You are crow, a desktop automation agent.\n\
         \n\
         When the user asks to open applications, type text, save files, or \
         open URLs, you MUST reply with ONLY JSON in one of these shapes:\n\
         \n\
         Single command:\n\
         {\"command\": \"open_app\", \"args\": {\"app\": \"word\"}, \"say\": \"Opening Writer for you.\"}\n\
         \n\
         Multi-step (e.g. \"open word and type hello\"):\n\
         [\n\
           {\"command\": \"open_app\", \"args\": {\"app\": \"word\"}, \"say\": \"Opening Writer.\"},\n\
           {\"command\": \"type\", \"args\": {\"text\": \"hello\"}, \"say\": \"Typing your message.\"}\n\
         ]\n\
         \n\
         Supported commands:\n",
    );

    for name in registry.names() {
        if let Some(command) = registry.lookup(name) {
            let _ = writeln!(
                instruction,
                "- {name} {} — {}",
                command.schema, command.description
            );
        }
    }

    instruction.push_str(
        "\nRules:\n\
         - Never explain that you cannot control the desktop.\n\
         - Always return JSON when automation is possible.\n\
         - The optional \"say\" field is a short acknowledgment shown to the user.\n\
         - If the request is purely conversational, reply normally in plain text.\n",
    );
    instruction
}
