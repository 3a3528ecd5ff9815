use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use match_predictor::config::Config;
use match_predictor::dashboard::{self, AppState};
use match_predictor::predictor::HttpPredictionClient;
use match_predictor::session::PredictionSession;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let client = HttpPredictionClient::new(&config.service_url, config.request_timeout())?;
    info!(
        "Prediction service: {} (deadline {:?}, selection {:?})",
        config.service_url,
        config.request_timeout(),
        config.selection_policy()
    );

    let session = PredictionSession::with_policy(
        Arc::new(client),
        config.request_timeout(),
        config.selection_policy(),
    );
    let app = dashboard::router(AppState { session });

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Match predictor listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
