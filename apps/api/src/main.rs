mod advisor;
mod config;
mod errors;
mod llm_client;
mod pdf;
mod plan;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pdf::{ChromiumLauncher, PdfExporter};
use crate::plan::FilePlanStore;
use crate::routes::build_router;
use crate::routes::rate_limit::RateLimiter;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Blue Sparrow API v{}", env!("CARGO_PKG_VERSION"));
    info!("Serving site from {}", config.site_root.display());

    let plans = Arc::new(FilePlanStore::new(config.plan_path()));
    info!("Plan store: {}", config.plan_path().display());

    let launcher = ChromiumLauncher::new(config.chrome_path.clone(), config.pdf_no_sandbox);
    let pdf = PdfExporter::new(Arc::new(launcher));
    if config.pdf_no_sandbox {
        info!("PDF export: headless browser sandbox disabled");
    }

    let llm = LlmClient::new(config.openai_api_key.clone(), config.openai_base_url.clone())?;
    if let Err(e) = llm.credential() {
        warn!("AI route will fail until configured: {e}");
    } else {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    }

    let rate_limiter = RateLimiter::per_minute(config.rate_limit_per_minute);
    info!(
        "Rate limit: {} requests per {}s per client",
        config.rate_limit_per_minute,
        routes::rate_limit::WINDOW.as_secs()
    );

    let state = AppState {
        config: config.clone(),
        plans,
        pdf,
        llm,
        rate_limiter,
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    // Peer addresses key the per-client rate limit.
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        return std::future::pending().await;
    }
    info!("Shutdown signal received");
}
