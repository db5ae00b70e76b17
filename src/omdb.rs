use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::models::{MovieDetails, SearchPage, SearchResult};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Connection refused, unreachable host or timeout.
    #[error("movie provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered but flagged the lookup as unsuccessful.
    #[error("{0}")]
    NotFound(String),

    /// Non-2xx answer carrying the provider's own error payload.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("unexpected provider response: {0}")]
    Unexpected(String),
}

impl UpstreamError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            UpstreamError::Unavailable(err.to_string())
        } else {
            UpstreamError::Unexpected(err.to_string())
        }
    }
}

pub struct OmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl OmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, rps: u32) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no OMDB_API_KEY provided, upstream calls will be rejected");
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, api_key, base_url, limiter }
    }

    /// Forwards the given query parameters and returns the provider's JSON as is.
    pub async fn proxy(&self, params: &[(&str, &str)]) -> Result<Value, UpstreamError> {
        self.get(params).await
    }

    pub async fn search_by_title(
        &self,
        query: &str,
        page: Option<u32>,
    ) -> Result<SearchPage, UpstreamError> {
        let page = page.map(|p| p.to_string());
        let mut params = vec![("s", query)];
        if let Some(page) = page.as_deref() {
            params.push(("page", page));
        }

        let body = self.get(&params).await?;
        let raw: RawSearchPage = serde_json::from_value(body)
            .map_err(|err| UpstreamError::Unexpected(err.to_string()))?;
        Ok(raw.into())
    }

    pub async fn fetch_by_id(&self, imdb_id: &str) -> Result<MovieDetails, UpstreamError> {
        let body = self.get(&[("i", imdb_id)]).await?;
        serde_json::from_value(body).map_err(|err| UpstreamError::Unexpected(err.to_string()))
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<Value, UpstreamError> {
        self.limiter.until_ready().await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(UpstreamError::from_transport)?;

        let status = resp.status();
        let body: Value = match resp.json().await {
            Ok(body) => body,
            Err(err) if err.is_timeout() => return Err(UpstreamError::from_transport(err)),
            Err(err) if status.is_success() => {
                return Err(UpstreamError::Unexpected(err.to_string()));
            },
            Err(_) => {
                return Err(UpstreamError::Unexpected(format!("provider returned {status}")));
            },
        };

        check_response(status, body)
    }
}

/// Applies the provider's `Response` flag on top of the HTTP status.
fn check_response(status: StatusCode, body: Value) -> Result<Value, UpstreamError> {
    let flagged_ok = match body.get("Response") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Bool(b)) => *b,
        _ => status.is_success(),
    };

    if flagged_ok && status.is_success() {
        return Ok(body);
    }

    let message = body.get("Error").and_then(Value::as_str).map(str::to_string);
    match (status.is_success(), message) {
        (true, message) => {
            Err(UpstreamError::NotFound(message.unwrap_or_else(|| "Movie not found!".to_string())))
        },
        (false, Some(message)) => Err(UpstreamError::Api { status: status.as_u16(), message }),
        (false, None) => Err(UpstreamError::Unexpected(format!("provider returned {status}"))),
    }
}

#[derive(Debug, Deserialize)]
struct RawSearchPage {
    #[serde(rename = "Search", default)]
    results: Vec<SearchResult>,
    #[serde(rename = "totalResults", default)]
    total: Option<Value>,
}

impl From<RawSearchPage> for SearchPage {
    fn from(raw: RawSearchPage) -> Self {
        let total = match raw.total {
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        };
        let total = total.unwrap_or(raw.results.len() as u32);
        SearchPage { results: raw.results, total }
    }
}
