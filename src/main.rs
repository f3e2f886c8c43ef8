use hopscotch_api::{
    api::{cors_layer, create_router, AppState},
    config::Config,
};
use tracing_subscriber::EnvFilter;

fn key_status(key: &Option<String>) -> &'static str {
    if key.is_some() {
        "set"
    } else {
        "missing"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hopscotch_api=info,tower_http=info")),
        )
        .init();

    tracing::info!(
        openai_api_key = key_status(&config.openai_api_key),
        pexels_api_key = key_status(&config.pexels_api_key),
        model = %config.openai_model,
        upstream_timeout_secs = config.upstream_timeout_secs,
        "Hopscotch API starting"
    );
    if config.openai_api_key.is_none() || config.pexels_api_key.is_none() {
        tracing::warn!("API keys missing; search and refine requests will fail until they are set");
    }

    let state = AppState::from_config(&config)?;
    let app = create_router(state).layer(cors_layer(&config.cors_allowed_origin)?);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
