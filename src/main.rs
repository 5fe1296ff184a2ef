use anyhow::{Context, Result};
use clap::Parser;
use meetscribe::transcribe::{DemoTranscriber, Transcriber, WhisperGateway};
use meetscribe::{create_router, AppState, Config};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "meetscribe", about = "Live meeting transcription server")]
struct Args {
    /// Config file base path (without extension)
    #[arg(long, default_value = "config/meetscribe")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meetscribe=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let transcriber: Arc<dyn Transcriber> = match cfg.whisper.api_key.clone() {
        Some(api_key) if !api_key.is_empty() => {
            info!("Whisper API configured, live transcription enabled");
            Arc::new(WhisperGateway::new(
                cfg.whisper.api_url.clone(),
                api_key,
                cfg.whisper.model.clone(),
                cfg.audio.max_payload_bytes,
            ))
        }
        _ => {
            warn!("No Whisper API key configured, serving demo transcripts");
            Arc::new(DemoTranscriber::new())
        }
    };

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg, transcriber);
    let router = create_router(state);

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, router)
        .await
        .context("HTTP server error")?;

    Ok(())
}
