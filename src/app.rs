//! Terminal presentation layer.
//!
//! One worker task per send performs the remote call and posts the result
//! back over a channel; the loop owns the display. An in-flight guard
//! refuses a second send while a request is outstanding, so overlapping
//! replies can never interleave automation over shared OS focus state.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::sync::Mutex;

use crate::agent::{run_reply, CommandRegistry, ExecutionOutcome};
use crate::automation::SharedDesktop;
use crate::error::AgentResult;
use crate::llm::GeminiClient;

/// Run the chat loop until end-of-input or `/quit`. Saves the exchange
/// history on the way out.
pub async fn run(
    client: GeminiClient,
    registry: Arc<CommandRegistry>,
    desktop: SharedDesktop,
) -> AgentResult<()> {
    let client = Arc::new(Mutex::new(client));
    let (reply_tx, mut reply_rx) = mpsc::channel::<AgentResult<String>>(1);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = false;

    println!("crow — type a request, or /quit to exit.");
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let text = match line {
                    Ok(Some(line)) => line.trim().to_string(),
                    Ok(None) => break,
                    Err(error) => {
                        tracing::warn!("stdin read failed: {error}");
                        break;
                    }
                };
                if text.is_empty() {
                    prompt();
                    continue;
                }
                if text == "/quit" || text == "/exit" {
                    break;
                }
                if in_flight {
                    println!("(still waiting on the previous request)");
                    prompt();
                    continue;
                }
                in_flight = true;
                let client = Arc::clone(&client);
                let reply_tx = reply_tx.clone();
                tokio::spawn(async move {
                    let reply = client.lock().await.generate(&text).await;
                    let _ = reply_tx.send(reply).await;
                });
            }
            Some(reply) = reply_rx.recv() => {
                in_flight = false;
                match reply {
                    Ok(text) => {
                        let outcome = process_reply(&registry, &desktop, text).await;
                        display(&outcome);
                    }
                    // Remote failures become an inline reply, never a crash.
                    Err(error) => println!("crow> [error] {error}"),
                }
                prompt();
            }
        }
    }

    if let Err(error) = client.lock().await.save_history().await {
        tracing::warn!("failed to save exchange history: {error}");
    }
    Ok(())
}

/// Parse and execute one reply on a blocking task; automation keystrokes
/// must not run on the async reactor.
async fn process_reply(
    registry: &Arc<CommandRegistry>,
    desktop: &SharedDesktop,
    text: String,
) -> ExecutionOutcome {
    let registry = Arc::clone(registry);
    let desktop = Arc::clone(desktop);
    tokio::task::spawn_blocking(move || run_reply(&registry, desktop.as_ref(), &text))
        .await
        .unwrap_or_else(|error| ExecutionOutcome {
            say: format!("[error] automation task failed: {error}"),
            results: String::new(),
        })
}

fn display(outcome: &ExecutionOutcome) {
    for line in outcome.say.lines() {
        println!("crow> {line}");
    }
    for line in outcome.results.lines() {
        println!(" sys> {line}");
    }
}

fn prompt() {
    print!("you> ");
    let _ = std::io::stdout().flush();
}
