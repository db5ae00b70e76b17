use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiQuery},
    models::{
        FavoriteAdded, FavoriteMovie, FavoriteRemoved, FavoriteRequest, HealthResponse,
        MovieDetails, NewFavorite, ReadinessResponse, SearchPage, ServiceInfo,
    },
    omdb::UpstreamError,
    templates,
};

pub async fn index() -> Html<String> {
    Html(templates::index_page())
}

pub async fn info(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "OMDb movie favorites API",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
    })
}

/// Liveness only; the store is not consulted.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "backend running",
        timestamp: jiff::Timestamp::now(),
    })
}

/// Dependency check: answers 503 while the store is unreachable.
pub async fn ready(State(state): State<Arc<AppState>>) -> Response {
    match state.store.ping().await {
        Ok(()) => Json(ReadinessResponse { status: "OK", database: "connected" }).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": err.to_string() })))
                .into_response()
        },
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    s: Option<String>,
    i: Option<String>,
    t: Option<String>,
    page: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    y: Option<String>,
}

impl ProxyQuery {
    /// Present, non-blank parameters in forwarding order.
    fn params(&self) -> Vec<(&'static str, &str)> {
        [
            ("s", &self.s),
            ("i", &self.i),
            ("t", &self.t),
            ("page", &self.page),
            ("type", &self.kind),
            ("y", &self.y),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then_some((key, value))
        })
        .collect()
    }
}

pub async fn proxy_omdb(
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<ProxyQuery>,
) -> AppResult<Json<Value>> {
    let params = q.params();
    if !params.iter().any(|(key, _)| matches!(*key, "s" | "i" | "t")) {
        return Err(AppError::validation("one of s, i or t is required"));
    }

    let body = state.omdb.proxy(&params).await?;
    Ok(Json(body))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    query: String,
    page: Option<String>,
}

impl SearchQuery {
    /// A blank `page` means "first page", like an absent one.
    fn page(&self) -> AppResult<Option<u32>> {
        let Some(raw) = self.page.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        match raw.parse::<u32>() {
            Ok(page) if page > 0 => Ok(Some(page)),
            _ => {
                Err(AppError::validation(format!("page must be a positive integer, got {raw:?}")))
            },
        }
    }
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<SearchQuery>,
) -> AppResult<Json<SearchPage>> {
    let page = q.page()?;
    match state.omdb.search_by_title(&q.query, page).await {
        Ok(page) => Ok(Json(page)),
        Err(UpstreamError::Unavailable(reason)) => match &state.fallback {
            Some(fallback) => {
                tracing::warn!(%reason, query = %q.query, "movie provider unreachable, serving mock data");
                Ok(Json(fallback.search(&q.query)))
            },
            None => Err(UpstreamError::Unavailable(reason).into()),
        },
        Err(err) => Err(err.into()),
    }
}

pub async fn movie_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<MovieDetails>> {
    Ok(Json(state.omdb.fetch_by_id(&id).await?))
}

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<FavoriteMovie>>> {
    Ok(Json(state.store.list_favorites().await?))
}

pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<FavoriteRequest>,
) -> AppResult<Json<FavoriteAdded>> {
    let favorite = NewFavorite::from(req);
    if favorite.imdb_id.is_empty() {
        return Err(AppError::validation("imdb_id is required"));
    }

    let id = state.store.upsert_favorite(favorite).await?;
    Ok(Json(FavoriteAdded { message: "Movie added to favorites", id }))
}

pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<FavoriteRemoved>> {
    let deleted = state.store.remove_favorite(&id).await?;
    tracing::debug!(imdb_id = %id, deleted, "favorite removed");
    Ok(Json(FavoriteRemoved { message: "Movie removed from favorites", deleted }))
}
