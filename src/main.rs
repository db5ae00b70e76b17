use std::sync::Arc;

use cinefav::{
    AppState, app,
    config::Config,
    fallback::{MockCatalog, SearchFallback},
    omdb::OmdbClient,
    store::DbFavoritesStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cinefav=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("cinefav/0.1")
        .timeout(config.omdb_timeout)
        .build()?;

    let omdb = OmdbClient::new(
        http,
        config.omdb_api_key.clone(),
        config.omdb_base_url.clone(),
        config.omdb_rps,
    );

    let store = DbFavoritesStore::connect(&config.database_url, config.reconnect).await;

    let fallback: Option<Arc<dyn SearchFallback>> = if config.mock_fallback {
        Some(Arc::new(MockCatalog::default()))
    } else {
        tracing::info!("mock search fallback disabled");
        None
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        omdb: Arc::new(omdb),
        store: Arc::new(store),
        fallback,
    });

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(
        addr = %config.addr,
        frontend = ?config.frontend_origin,
        "listening"
    );
    axum::serve(listener, app(state)).await?;

    Ok(())
}
