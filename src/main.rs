use std::sync::Arc;

use crow::agent::default_registry;
use crow::automation::default_desktop;
use crow::llm::{system_instruction, GeminiClient};
use crow::storage::{FileHistoryStore, SharedHistoryStore};
use crow::{app, logging, Settings};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // The API key is the one fatal start-up condition; fail before any UI.
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    let _log_guard = logging::init(&settings.log_dir);
    tracing::info!("starting crow (model {})", settings.model);

    let registry = Arc::new(default_registry());
    let desktop = default_desktop();
    let store: SharedHistoryStore = Arc::new(FileHistoryStore::new(settings.history_path.clone()));
    let instruction = system_instruction(&registry);
    let client = GeminiClient::new(&settings, instruction, store).await;

    if let Err(error) = app::run(client, registry, desktop).await {
        tracing::error!("exited with error: {error}");
        std::process::exit(1);
    }
}
