#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    body::Body,
    extract::Query,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing,
};
use cinefav::{
    AppState, app,
    config::Config,
    db,
    fallback::{MockCatalog, SearchFallback},
    omdb::OmdbClient,
    store::{DbFavoritesStore, FavoritesStore},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const API_KEY: &str = "test-key";

/// Nothing listens here, so connections are refused.
pub const UNREACHABLE: &str = "http://127.0.0.1:1/";

/// Requests with `s=slow` take this long, past the client timeout.
const SLOW_RESPONSE: Duration = Duration::from_secs(2);
const CLIENT_TIMEOUT: Duration = Duration::from_millis(500);

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "FRONTEND_URL" => Some("http://localhost:5173".to_string()),
        "APP_ENV" => Some("test".to_string()),
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        _ => None,
    })
    .unwrap()
}

pub async fn memory_store() -> Arc<DbFavoritesStore> {
    Arc::new(DbFavoritesStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap()))
}

pub fn build_app(
    omdb_base_url: &str,
    store: Arc<dyn FavoritesStore>,
    fallback: Option<Arc<dyn SearchFallback>>,
) -> Router {
    let http = reqwest::Client::builder().timeout(CLIENT_TIMEOUT).build().unwrap();
    let omdb = OmdbClient::new(http, API_KEY.to_string(), omdb_base_url.to_string(), 100);

    app(Arc::new(AppState {
        config: Arc::new(test_config()),
        omdb: Arc::new(omdb),
        store,
        fallback,
    }))
}

/// App against the stub provider, an in-memory store and the mock catalog.
pub async fn default_app() -> Router {
    let base = spawn_stub_omdb().await;
    build_app(&base, memory_store().await, Some(Arc::new(MockCatalog::default())))
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response {
    app.oneshot(Request::delete(uri).body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    post_raw(app, uri, Some("application/json"), body.to_string()).await
}

pub async fn post_raw(
    app: Router,
    uri: &str,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> Response {
    let mut request = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header(CONTENT_TYPE, content_type);
    }
    app.oneshot(request.body(body.into()).unwrap()).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Starts a local stand-in for OMDb and returns its base URL.
pub async fn spawn_stub_omdb() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = Router::new().route("/", routing::get(stub_omdb));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

async fn stub_omdb(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("apikey").map(String::as_str) != Some(API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "Response": "False", "Error": "Invalid API key!" })),
        )
            .into_response();
    }

    let mut received: Vec<&str> =
        params.keys().map(String::as_str).filter(|k| *k != "apikey").collect();
    received.sort_unstable();

    if let Some(id) = params.get("i") {
        return Json(match id.as_str() {
            "tt0468569" => dark_knight_details(),
            _ => json!({ "Response": "False", "Error": "Incorrect IMDb ID." }),
        })
        .into_response();
    }

    if params.get("t").is_some() {
        return Json(dark_knight_details()).into_response();
    }

    match params.get("s").map(String::as_str) {
        Some("slow") => {
            tokio::time::sleep(SLOW_RESPONSE).await;
            Json(json!({ "Response": "False", "Error": "Too late" })).into_response()
        },
        Some("broken") => (StatusCode::OK, "<html>not json</html>").into_response(),
        Some("batman") if params.get("page").map(String::as_str) == Some("2") => Json(json!({
            "Search": [
                { "Title": "Batman Returns", "Year": "1992", "imdbID": "tt0103776", "Type": "movie", "Poster": "N/A" }
            ],
            "totalResults": "3",
            "Response": "True",
            "received": received,
        }))
        .into_response(),
        Some("batman") => Json(json!({
            "Search": [
                { "Title": "Batman Begins", "Year": "2005", "imdbID": "tt0372784", "Type": "movie", "Poster": "N/A" },
                { "Title": "Batman", "Year": "1989", "imdbID": "tt0096895", "Type": "movie", "Poster": "N/A" }
            ],
            "totalResults": "2",
            "Response": "True",
            "received": received,
        }))
        .into_response(),
        _ => Json(json!({ "Response": "False", "Error": "Movie not found!" })).into_response(),
    }
}

fn dark_knight_details() -> Value {
    json!({
        "Title": "The Dark Knight",
        "Year": "2008",
        "imdbID": "tt0468569",
        "Type": "movie",
        "Poster": "N/A",
        "Director": "Christopher Nolan",
        "Response": "True"
    })
}
