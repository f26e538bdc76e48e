//! Parsers for model output.
//!
//! Structured replies are one JSON object or an array of them, possibly
//! embedded in surrounding prose. Anything that does not decode is chat
//! text, never an error. The free-text parser is the fallback heuristic for
//! `open_type_save` given a raw instruction instead of structured args.

use serde_json::{json, Value};

use super::command::{CommandKind, Invocation};
use super::handlers::alias_in_text;

/// Outcome of scanning a raw model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// No executable command; display the text as-is.
    Chat(String),
    /// Decoded command batch, in wire order.
    Commands(Vec<Invocation>),
}

/// Extract command invocations from a raw reply.
///
/// The outermost `[..]` span is preferred over the outermost `{..}` span
/// when both decode; a bare object is a single-element batch. Records that
/// are not objects, lack a command name, or name an unknown command are
/// silently dropped.
pub fn parse_reply(text: &str) -> Reply {
    let text = text.trim();
    for span in [delimited_span(text, '[', ']'), delimited_span(text, '{', '}')]
        .into_iter()
        .flatten()
    {
        let Ok(value) = serde_json::from_str::<Value>(span) else {
            continue;
        };
        let records = match value {
            Value::Array(items) => items,
            object @ Value::Object(_) => vec![object],
            _ => continue,
        };
        let invocations = records.iter().filter_map(decode_record).collect();
        return Reply::Commands(invocations);
    }
    Reply::Chat(text.to_string())
}

/// The span from the first `open` to the last `close`, if both exist in
/// order.
fn delimited_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end > start {
        text.get(start..=end)
    } else {
        None
    }
}

fn decode_record(value: &Value) -> Option<Invocation> {
    let record = value.as_object()?;
    let command = record.get("command")?.as_str()?;
    let args = record.get("args").cloned().unwrap_or_else(|| json!({}));
    let kind: CommandKind = match serde_json::from_value(json!({"command": command, "args": args}))
    {
        Ok(kind) => kind,
        Err(error) => {
            tracing::debug!("skipping unrecognized command record {command:?}: {error}");
            return None;
        }
    };
    let say = record
        .get("say")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|say| !say.is_empty())
        .map(String::from);
    Some(Invocation { kind, say })
}

/// Arguments derived from a free-form instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeTextArgs {
    pub app: String,
    pub text: String,
    pub filename: String,
}

/// Best-effort parse of instructions like
/// `open word and type hello and save MyDoc`.
///
/// This is a heuristic, not a grammar: the first matching application alias
/// wins, the clause after `type` (up to a following `save`) is the text, and
/// the clause after `save` is the filename, with the literal word `and`
/// removed. Reordered or overlapping clauses produce empty or wrong fields
/// silently.
pub fn parse_free_text(input: &str) -> FreeTextArgs {
    let input = input.to_lowercase();

    let app = alias_in_text(&input).unwrap_or_default().to_string();

    let mut text = String::new();
    if let Some((_, after_type)) = input.split_once("type") {
        let clause = match after_type.split_once("save") {
            Some((before_save, _)) => before_save,
            None => after_type,
        };
        text = strip_word_and(clause);
    }

    let mut filename = String::new();
    if let Some((_, after_save)) = input.split_once("save") {
        filename = strip_word_and(after_save);
    }

    FreeTextArgs {
        app,
        text,
        filename,
    }
}

/// Remove the literal word `and` (as a word, not a substring) and collapse
/// whitespace.
fn strip_word_and(clause: &str) -> String {
    clause
        .split_whitespace()
        .filter(|word| *word != "and")
        .collect::<Vec<_>>()
        .join(" ")
}
