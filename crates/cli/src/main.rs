//! Wallet support decision engine, stdin front end
//!
//! Reads one utterance per line and prints the decision for it as a JSON
//! line on stdout. All lines share one session, so clarification rounds
//! accumulate the way they would in a chat.
//!
//! ```text
//! wallet-support [--session <id>]
//!   :reset   forget the session's clarify count and history
//!   :quit    exit
//! ```

use anyhow::Context;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use wallet_support_agent::SupportPipeline;
use wallet_support_config::{load_settings, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("WALLET_SUPPORT_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing is not initialized yet
            eprintln!("Warning: failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&settings);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?settings.environment,
        config = env.as_deref().unwrap_or("default"),
        graph = ?settings.retrieval.backend,
        llm_fallback = settings.llm.enabled,
        "Starting wallet support engine"
    );

    let pipeline = Arc::new(
        SupportPipeline::from_settings(&settings).context("failed to build pipeline")?,
    );
    let cleanup = pipeline.start_cleanup_task();
    let session_id = session_from_args().unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!(session_id = %session_id, "Session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let utterance = line.trim();
        match utterance {
            "" => continue,
            ":quit" => break,
            ":reset" => {
                if let Err(e) = pipeline.clear_session(&session_id).await {
                    tracing::warn!(error = %e, "Session reset failed");
                }
                continue;
            }
            _ => {}
        }

        let response = pipeline.process(&session_id, utterance).await;
        let mut json = serde_json::to_string(&response).context("failed to encode response")?;
        json.push('\n');
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
    }

    let _ = cleanup.send(true);
    tracing::info!(session_id = %session_id, "Session ended");
    Ok(())
}

fn session_from_args() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--session" {
            return args.next();
        }
        if let Some(id) = arg.strip_prefix("--session=") {
            return Some(id.to_string());
        }
    }
    None
}

/// Logs go to stderr so stdout carries only decisions
fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("wallet_support={}", level).into()
    });

    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
