//! Built-in command handlers and the default registry.
//!
//! Handlers return one human-readable status line. Failure is signaled by
//! the [`FAILURE_MARKER`] prefix, not a structured error, so callers can
//! branch on the string without an error type crossing the registry seam.

use std::time::Duration;

use serde_json::json;

use crate::automation::{wait_for_window, Desktop};

use super::command::{Command, CommandKind, CommandRegistry};
use super::parser::parse_free_text;

/// Distinguished substring prefix in a handler result denoting failure.
pub const FAILURE_MARKER: &str = "⚠️";

/// Whether a handler result string carries the failure marker.
pub fn is_failure(result: &str) -> bool {
    result.contains(FAILURE_MARKER)
}

/// One whitelisted application the agent may drive.
struct AppEntry {
    /// Canonical key used in command arguments.
    key: &'static str,
    /// Human name used in result strings.
    display: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    /// Substring expected in the application's window title.
    window: &'static str,
    /// Accepted spellings, longest first.
    aliases: &'static [&'static str],
}

const APPS: &[AppEntry] = &[
    AppEntry {
        key: "word",
        display: "Writer",
        program: "libreoffice",
        args: &["--writer"],
        window: "LibreOffice Writer",
        aliases: &["microsoft word", "ms word", "word", "writer"],
    },
    AppEntry {
        key: "excel",
        display: "Calc",
        program: "libreoffice",
        args: &["--calc"],
        window: "LibreOffice Calc",
        aliases: &["microsoft excel", "ms excel", "excel", "calc", "spreadsheet"],
    },
    AppEntry {
        key: "powerpoint",
        display: "Impress",
        program: "libreoffice",
        args: &["--impress"],
        window: "LibreOffice Impress",
        aliases: &["microsoft powerpoint", "ms powerpoint", "powerpoint", "impress"],
    },
];

/// Resolve an exact alias (or canonical key) to its application.
fn resolve_alias(input: &str) -> Option<&'static AppEntry> {
    let input = input.trim().to_lowercase();
    APPS.iter()
        .find(|entry| entry.key == input || entry.aliases.contains(&input.as_str()))
}

/// First application whose alias occurs as a substring of `text`.
/// Used by the free-text parser; returns the canonical key.
pub fn alias_in_text(text: &str) -> Option<&'static str> {
    APPS.iter()
        .find(|entry| entry.aliases.iter().any(|alias| text.contains(alias)))
        .map(|entry| entry.key)
}

/// Timing knobs for window polling and the fixed UI-settle pauses.
///
/// The pauses substitute for event-based synchronization, a known
/// fragility inherited from the command design.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    /// How long `open_app` waits for the window to appear.
    pub window_timeout: Duration,
    /// Poll interval while waiting for a window.
    pub poll: Duration,
    /// Short probe used to detect the currently active known window.
    pub probe_timeout: Duration,
    /// Pause after `ctrl+n` for the new document to settle.
    pub settle: Duration,
    /// Pause around the save dialog keystrokes.
    pub save_pause: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            window_timeout: Duration::from_secs(15),
            poll: Duration::from_millis(300),
            probe_timeout: Duration::from_millis(500),
            settle: Duration::from_secs(2),
            save_pause: Duration::from_millis(500),
        }
    }
}

impl Pacing {
    /// Zero-length waits everywhere; window probes still run exactly once.
    pub fn instant() -> Self {
        Self {
            window_timeout: Duration::ZERO,
            poll: Duration::ZERO,
            probe_timeout: Duration::ZERO,
            settle: Duration::ZERO,
            save_pause: Duration::ZERO,
        }
    }
}

/// Which known application currently has a window up, focusing it as a side
/// effect. Probes each known app with a short timeout.
fn active_known_app(desktop: &dyn Desktop, pacing: Pacing) -> Option<&'static AppEntry> {
    APPS.iter()
        .find(|entry| wait_for_window(desktop, entry.window, pacing.probe_timeout, pacing.poll))
}

fn run_open_app(app: &str, desktop: &dyn Desktop, pacing: Pacing) -> String {
    let Some(entry) = resolve_alias(app) else {
        return format!("{FAILURE_MARKER} Unknown or missing app: '{app}'");
    };
    if let Err(error) = desktop.launch(entry.program, entry.args) {
        return format!("{FAILURE_MARKER} Could not launch {}: {error}", entry.display);
    }
    if !wait_for_window(desktop, entry.window, pacing.window_timeout, pacing.poll) {
        return format!("{FAILURE_MARKER} Could not detect a {} window.", entry.display);
    }
    format!("✅ Opened {}", entry.display)
}

fn run_new_document(app: &str, desktop: &dyn Desktop, pacing: Pacing) -> String {
    // Unrecognized app falls back to the first known one, matching the
    // command's lenient contract.
    let entry = resolve_alias(app).unwrap_or(&APPS[0]);
    if !wait_for_window(desktop, entry.window, pacing.window_timeout, pacing.poll) {
        return format!("{FAILURE_MARKER} {} window not ready.", entry.display);
    }
    if let Err(error) = desktop.send_key("ctrl+n") {
        return format!("{FAILURE_MARKER} Could not send shortcut: {error}");
    }
    std::thread::sleep(pacing.settle);
    format!("📝 Created a new blank {} document.", entry.display)
}

fn run_type(text: &str, desktop: &dyn Desktop, pacing: Pacing) -> String {
    if text.is_empty() {
        return format!("{FAILURE_MARKER} Missing 'text'");
    }
    let Some(entry) = active_known_app(desktop, pacing) else {
        return format!("{FAILURE_MARKER} No known application window is active.");
    };
    if let Err(error) = desktop.type_text(text) {
        return format!("{FAILURE_MARKER} Could not type text: {error}");
    }
    format!("✍️ Typed in {}: '{text}'", entry.display)
}

fn run_save_file(filename: &str, desktop: &dyn Desktop, pacing: Pacing) -> String {
    if filename.is_empty() {
        return format!("{FAILURE_MARKER} Missing 'filename'");
    }
    let Some(entry) = active_known_app(desktop, pacing) else {
        return format!("{FAILURE_MARKER} No known application window is active.");
    };
    if let Err(error) = desktop.send_key("ctrl+s") {
        return format!("{FAILURE_MARKER} Could not open the save dialog: {error}");
    }
    std::thread::sleep(pacing.save_pause);
    if let Err(error) = desktop.type_text(filename) {
        return format!("{FAILURE_MARKER} Could not type the filename: {error}");
    }
    std::thread::sleep(pacing.save_pause);
    if let Err(error) = desktop.send_key("Return") {
        return format!("{FAILURE_MARKER} Could not confirm the save dialog: {error}");
    }
    std::thread::sleep(pacing.save_pause);
    format!("💾 Saved {} file as: {filename}", entry.display)
}

fn run_open_url(url: &str, desktop: &dyn Desktop) -> String {
    if url.is_empty() {
        return format!("{FAILURE_MARKER} Missing 'url'");
    }
    match desktop.open_url(url) {
        Ok(()) => format!("🌐 Opened {url}"),
        Err(error) => format!("{FAILURE_MARKER} Could not open {url}: {error}"),
    }
}

/// Composite open -> new document -> type -> save flow.
///
/// Given `command_text`, arguments are derived through the free-text parser
/// first. The sequence stops at the first failure-marked step and reports
/// the partial transcript; successful steps are one line each, in order.
fn run_open_type_save(
    app: &str,
    text: &str,
    filename: &str,
    command_text: Option<&str>,
    desktop: &dyn Desktop,
    pacing: Pacing,
) -> String {
    let derived;
    let (app, text, filename) = match command_text {
        Some(raw) => {
            derived = parse_free_text(raw);
            (
                derived.app.as_str(),
                derived.text.as_str(),
                derived.filename.as_str(),
            )
        }
        None => (app, text, filename),
    };

    let mut lines = Vec::new();

    if push_line(&mut lines, run_open_app(app, desktop, pacing)) {
        return lines.join("\n");
    }
    if push_line(&mut lines, run_new_document(app, desktop, pacing)) {
        return lines.join("\n");
    }
    if !text.is_empty() && push_line(&mut lines, run_type(text, desktop, pacing)) {
        return lines.join("\n");
    }
    if !filename.is_empty() && push_line(&mut lines, run_save_file(filename, desktop, pacing)) {
        return lines.join("\n");
    }
    lines.join("\n")
}

/// Append a step result, reporting whether it carried the failure marker.
fn push_line(lines: &mut Vec<String>, line: String) -> bool {
    let failed = is_failure(&line);
    lines.push(line);
    failed
}

fn argument_mismatch(expected: &str, kind: &CommandKind) -> String {
    format!(
        "{FAILURE_MARKER} '{expected}' invoked with arguments for '{}'",
        kind.name()
    )
}

/// Build the default registry with all built-in commands.
pub fn default_registry() -> CommandRegistry {
    registry_with_pacing(Pacing::default())
}

/// Build the registry with explicit timing, used by tests to avoid real
/// waits.
pub fn registry_with_pacing(pacing: Pacing) -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register(Command {
        name: "open_app".to_string(),
        description: "Open a whitelisted application and wait for its window".to_string(),
        schema: json!({"app": "string"}),
        handler: Box::new(move |kind, desktop| match kind {
            CommandKind::OpenApp { app } => run_open_app(app, desktop, pacing),
            other => argument_mismatch("open_app", other),
        }),
    });

    registry.register(Command {
        name: "new_document".to_string(),
        description: "Create a new blank document in an already-open application".to_string(),
        schema: json!({"app": "string"}),
        handler: Box::new(move |kind, desktop| match kind {
            CommandKind::NewDocument { app } => run_new_document(app, desktop, pacing),
            other => argument_mismatch("new_document", other),
        }),
    });

    registry.register(Command {
        name: "type".to_string(),
        description: "Type text into the active known application window".to_string(),
        schema: json!({"text": "string"}),
        handler: Box::new(move |kind, desktop| match kind {
            CommandKind::Type { text } => run_type(text, desktop, pacing),
            other => argument_mismatch("type", other),
        }),
    });

    registry.register(Command {
        name: "save_file".to_string(),
        description: "Save the current document under a filename".to_string(),
        schema: json!({"filename": "string"}),
        handler: Box::new(move |kind, desktop| match kind {
            CommandKind::SaveFile { filename } => run_save_file(filename, desktop, pacing),
            other => argument_mismatch("save_file", other),
        }),
    });

    registry.register(Command {
        name: "open_type_save".to_string(),
        description: "Open an application, create a document, type text, and save it".to_string(),
        schema: json!({
            "app": "string",
            "text": "string",
            "filename": "string",
            "command_text": "string (raw instruction, parsed as a fallback)"
        }),
        handler: Box::new(move |kind, desktop| match kind {
            CommandKind::OpenTypeSave {
                app,
                text,
                filename,
                command_text,
            } => run_open_type_save(
                app,
                text,
                filename,
                command_text.as_deref(),
                desktop,
                pacing,
            ),
            other => argument_mismatch("open_type_save", other),
        }),
    });

    registry.register(Command {
        name: "open_url".to_string(),
        description: "Open a URL in the default browser".to_string(),
        schema: json!({"url": "string"}),
        handler: Box::new(move |kind, desktop| match kind {
            CommandKind::OpenUrl { url } => run_open_url(url, desktop),
            other => argument_mismatch("open_url", other),
        }),
    });

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::testing::MockDesktop;

    const WRITER: &str = "Document 1 - LibreOffice Writer";
    const CALC: &str = "Untitled - LibreOffice Calc";

    #[test]
    fn default_registry_has_all_commands() {
        let registry = default_registry();
        assert_eq!(
            registry.names(),
            vec![
                "new_document",
                "open_app",
                "open_type_save",
                "open_url",
                "save_file",
                "type"
            ]
        );
    }

    #[test]
    fn open_app_unknown_alias_fails_without_launch() {
        let desktop = MockDesktop::with_titles(&[]);
        let result = run_open_app("emacs", &desktop, Pacing::instant());
        assert!(is_failure(&result));
        assert!(desktop.calls().is_empty());
    }

    #[test]
    fn open_app_success_launches_and_focuses() {
        let desktop = MockDesktop::with_titles(&[WRITER]);
        let result = run_open_app("ms word", &desktop, Pacing::instant());
        assert_eq!(result, "✅ Opened Writer");
        assert_eq!(
            desktop.calls(),
            vec!["launch libreoffice".to_string(), format!("focus {WRITER}")]
        );
    }

    #[test]
    fn open_app_fails_when_window_never_appears() {
        let desktop = MockDesktop::with_titles(&[]);
        let result = run_open_app("word", &desktop, Pacing::instant());
        assert!(is_failure(&result));
        assert_eq!(desktop.calls(), vec!["launch libreoffice".to_string()]);
    }

    #[test]
    fn type_requires_text() {
        let desktop = MockDesktop::with_titles(&[WRITER]);
        let result = run_type("", &desktop, Pacing::instant());
        assert!(is_failure(&result));
        assert!(desktop.calls().is_empty());
    }

    #[test]
    fn type_requires_active_known_window() {
        let desktop = MockDesktop::with_titles(&["Firefox"]);
        let result = run_type("hello", &desktop, Pacing::instant());
        assert!(is_failure(&result));
        assert!(!desktop.calls().iter().any(|call| call.starts_with("type")));
    }

    #[test]
    fn type_targets_whichever_known_app_is_up() {
        let desktop = MockDesktop::with_titles(&[CALC]);
        let result = run_type("42", &desktop, Pacing::instant());
        assert_eq!(result, "✍️ Typed in Calc: '42'");
        assert!(desktop.calls().contains(&"type 42".to_string()));
    }

    #[test]
    fn save_file_sends_dialog_keystrokes_in_order() {
        let desktop = MockDesktop::with_titles(&[WRITER]);
        let result = run_save_file("mydoc", &desktop, Pacing::instant());
        assert_eq!(result, "💾 Saved Writer file as: mydoc");
        assert_eq!(
            desktop.calls(),
            vec![
                format!("focus {WRITER}"),
                "key ctrl+s".to_string(),
                "type mydoc".to_string(),
                "key Return".to_string()
            ]
        );
    }

    #[test]
    fn open_url_reaches_primitive_once() {
        let desktop = MockDesktop::with_titles(&[]);
        let result = run_open_url("https://example.com", &desktop);
        assert_eq!(result, "🌐 Opened https://example.com");
        assert_eq!(desktop.calls(), vec!["url https://example.com".to_string()]);
    }

    #[test]
    fn open_type_save_app_only_skips_type_and_save() {
        let desktop = MockDesktop::with_titles(&[WRITER]);
        let result =
            run_open_type_save("word", "", "", None, &desktop, Pacing::instant());
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "✅ Opened Writer");
        assert!(lines[1].contains("new blank Writer document"));
        assert!(!desktop.calls().iter().any(|call| call.starts_with("type")));
        assert!(!desktop.calls().contains(&"key ctrl+s".to_string()));
    }

    #[test]
    fn open_type_save_short_circuits_on_open_failure() {
        let desktop = MockDesktop::with_titles(&[]);
        let result = run_open_type_save(
            "word",
            "hello",
            "mydoc",
            None,
            &desktop,
            Pacing::instant(),
        );
        assert!(is_failure(&result));
        assert_eq!(result.lines().count(), 1);
        assert!(!desktop.calls().contains(&"key ctrl+n".to_string()));
    }

    #[test]
    fn open_type_save_derives_args_from_command_text() {
        let desktop = MockDesktop::with_titles(&[WRITER]);
        let result = run_open_type_save(
            "",
            "",
            "",
            Some("open word and type hello world and save mydoc"),
            &desktop,
            Pacing::instant(),
        );
        assert!(!is_failure(&result));
        assert_eq!(result.lines().count(), 4);
        assert!(desktop.calls().contains(&"type hello world".to_string()));
        assert!(desktop.calls().contains(&"type mydoc".to_string()));
    }

    #[test]
    fn alias_in_text_prefers_table_order() {
        assert_eq!(alias_in_text("please open microsoft word now"), Some("word"));
        assert_eq!(alias_in_text("open the spreadsheet"), Some("excel"));
        assert_eq!(alias_in_text("open my browser"), None);
    }
}
