use std::sync::Arc;

use anyhow::Context;
use chat_relay::{
    config::Config,
    routes,
    services::{completion::OpenAiClient, relay::ChatRelay},
    state::AppState,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("could not load configuration")?;
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set, every chat request will fail");
    }
    if config.uses_default_secret() {
        warn!("SECRET_KEY not set, using the built-in fallback");
    }
    if config.openai_timeout.is_none() {
        info!("no OPENAI_TIMEOUT_SECS set, provider calls wait indefinitely");
    }

    let client = OpenAiClient::new(
        config.openai_api_key.as_deref(),
        &config.openai_base_url,
        config.openai_timeout,
    )
    .context("could not build completion client")?;
    let state = Arc::new(AppState::new(ChatRelay::new(Arc::new(client))));

    let app = routes::create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("could not bind {}", config.bind_addr))?;

    info!("chat relay listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
