//! OS automation primitives.
//!
//! Each primitive performs one OS interaction and knows nothing about the
//! command schema. Typing goes to whichever window currently holds input
//! focus; callers are responsible for focusing the right window first.

use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{AgentError, AgentResult};

pub trait Desktop: Send + Sync {
    /// Launch a process detached from the agent. Does not wait for a window.
    fn launch(&self, program: &str, args: &[&str]) -> AgentResult<()>;

    /// Titles of all currently visible windows.
    fn window_titles(&self) -> AgentResult<Vec<String>>;

    /// Activate the first window whose title contains `partial`
    /// (case-insensitive). Returns whether any window matched.
    fn focus_window(&self, partial: &str) -> AgentResult<bool>;

    /// Send literal text as keystrokes to the focused window.
    fn type_text(&self, text: &str) -> AgentResult<()>;

    /// Send a key chord such as `ctrl+n` or `Return` to the focused window.
    fn send_key(&self, chord: &str) -> AgentResult<()>;

    /// Open a URL in the OS default handler. Fire-and-forget.
    fn open_url(&self, url: &str) -> AgentResult<()>;
}

pub type SharedDesktop = Arc<dyn Desktop>;

pub fn default_desktop() -> SharedDesktop {
    Arc::new(XdotoolDesktop::new())
}

/// Poll until a window whose title contains `partial` appears, then focus
/// it. Returns whether the window appeared within `timeout`.
pub fn wait_for_window(
    desktop: &dyn Desktop,
    partial: &str,
    timeout: Duration,
    poll: Duration,
) -> bool {
    let start = Instant::now();
    loop {
        match desktop.focus_window(partial) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(error) => {
                tracing::debug!("window probe for {partial:?} failed: {error}");
            }
        }
        if start.elapsed() >= timeout {
            return false;
        }
        std::thread::sleep(poll);
    }
}

/// Desktop automation backed by the `xdotool` command-line tool.
///
/// All methods are blocking; handlers run on a blocking task, not on the
/// async reactor.
pub struct XdotoolDesktop;

impl XdotoolDesktop {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, args: &[&str]) -> AgentResult<String> {
        let output = Command::new("xdotool")
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|error| AgentError::Automation(format!("failed to run xdotool: {error}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AgentError::Automation(format!(
                "xdotool {} failed: {}",
                args.first().copied().unwrap_or(""),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Ids of all visible windows. `search` exits non-zero when nothing
    /// matches, which is an empty result here, not an error.
    fn window_ids(&self) -> AgentResult<Vec<String>> {
        let output = Command::new("xdotool")
            .args(["search", "--onlyvisible", "--name", "."])
            .stdin(Stdio::null())
            .output()
            .map_err(|error| AgentError::Automation(format!("failed to run xdotool: {error}")))?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }
}

impl Default for XdotoolDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl Desktop for XdotoolDesktop {
    fn launch(&self, program: &str, args: &[&str]) -> AgentResult<()> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|error| {
                AgentError::Automation(format!("failed to launch {program}: {error}"))
            })
    }

    fn window_titles(&self) -> AgentResult<Vec<String>> {
        let mut titles = Vec::new();
        for id in self.window_ids()? {
            if let Ok(name) = self.run(&["getwindowname", &id]) {
                titles.push(name.trim().to_string());
            }
        }
        Ok(titles)
    }

    fn focus_window(&self, partial: &str) -> AgentResult<bool> {
        let needle = partial.to_lowercase();
        for id in self.window_ids()? {
            let Ok(name) = self.run(&["getwindowname", &id]) else {
                continue;
            };
            if name.trim().to_lowercase().contains(&needle) {
                self.run(&["windowactivate", "--sync", &id])?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn type_text(&self, text: &str) -> AgentResult<()> {
        self.run(&["type", "--clearmodifiers", "--delay", "20", text])
            .map(|_| ())
    }

    fn send_key(&self, chord: &str) -> AgentResult<()> {
        self.run(&["key", "--clearmodifiers", chord]).map(|_| ())
    }

    fn open_url(&self, url: &str) -> AgentResult<()> {
        open::that_detached(url)
            .map_err(|error| AgentError::Automation(format!("failed to open {url}: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::testing::MockDesktop;

    #[test]
    fn wait_for_window_returns_true_when_present() {
        let desktop = MockDesktop::with_titles(&["LibreOffice Writer"]);
        assert!(wait_for_window(
            &desktop,
            "libreoffice writer",
            Duration::ZERO,
            Duration::ZERO,
        ));
        assert_eq!(desktop.calls(), vec!["focus LibreOffice Writer"]);
    }

    #[test]
    fn wait_for_window_times_out_when_absent() {
        let desktop = MockDesktop::with_titles(&[]);
        assert!(!wait_for_window(
            &desktop,
            "writer",
            Duration::ZERO,
            Duration::ZERO,
        ));
    }
}
