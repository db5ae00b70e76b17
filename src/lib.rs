pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod models;
pub mod omdb;
pub mod routes;
pub mod store;
pub mod templates;

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, fallback::SearchFallback, omdb::OmdbClient, store::FavoritesStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub omdb: Arc<OmdbClient>,
    pub store: Arc<dyn FavoritesStore>,
    /// Consulted only by the plain search route when the provider is unreachable.
    pub fallback: Option<Arc<dyn SearchFallback>>,
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.frontend_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let movies = Router::new()
        .route("/search", get(routes::search))
        .route("/proxy/omdb", get(routes::proxy_omdb))
        .route("/favorites", post(routes::add_favorite))
        .route("/favorites/all", get(routes::list_favorites))
        .route("/favorites/{id}", delete(routes::remove_favorite))
        .route("/{id}", get(routes::movie_by_id));

    Router::new()
        .route("/", get(routes::index))
        .route("/api", get(routes::info))
        .route("/api/health", get(routes::health))
        .route("/api/health/ready", get(routes::ready))
        .nest("/api/movies", movies)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}
