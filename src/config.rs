use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use axum::http::HeaderValue;

use crate::store::ReconnectPolicy;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub frontend_origin: HeaderValue,
    pub database_url: String,
    pub reconnect: ReconnectPolicy,
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    pub omdb_timeout: Duration,
    pub omdb_rps: u32,
    pub mock_fallback: bool,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("BACKEND_PORT")
            .or_else(|| var("PORT"))
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .context("BACKEND_PORT")?;

        let frontend_url = var("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_string());
        let frontend_origin =
            HeaderValue::from_str(frontend_url.trim_end_matches('/')).context("FRONTEND_URL")?;

        let reconnect = ReconnectPolicy {
            attempts: parse_or(&var, "DB_RECONNECT_ATTEMPTS", 1)?,
            delay: Duration::from_secs(parse_or(&var, "DB_RECONNECT_DELAY_SECS", 2)?),
        };

        let omdb_api_key = var("OMDB_API_KEY").unwrap_or_default();
        let omdb_base_url =
            var("OMDB_BASE_URL").unwrap_or_else(|| "http://www.omdbapi.com/".to_string());
        let omdb_timeout = Duration::from_secs(parse_or(&var, "OMDB_TIMEOUT_SECS", 10)?);
        let omdb_rps: u32 = parse_or(&var, "OMDB_RPS", 10)?;

        let mock_fallback = var("MOCK_FALLBACK")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        let environment = var("APP_ENV").unwrap_or_else(|| "development".to_string());

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/BACKEND_PORT")?,
            frontend_origin,
            database_url: database_url(&var)?,
            reconnect,
            omdb_api_key,
            omdb_base_url,
            omdb_timeout,
            omdb_rps,
            mock_fallback,
            environment,
        })
    }
}

/// `DATABASE_URL` wins; otherwise MySQL from the `DB_*` parts, else a local SQLite file.
fn database_url(var: &impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    if let Some(url) = var("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
        return Ok(url);
    }

    let Some(host) = var("DB_HOST").filter(|h| !h.trim().is_empty()) else {
        return Ok("sqlite://cinefav.db?mode=rwc".to_string());
    };

    let user = var("DB_USER").unwrap_or_else(|| "root".to_string());
    let password = var("DB_PASSWORD").unwrap_or_default();
    let name = var("DB_NAME").context("DB_NAME is required when DB_HOST is set")?;
    let port: u16 = parse_or(var, "DB_PORT", 3306)?;

    let credentials = if password.is_empty() {
        urlencoding::encode(&user).into_owned()
    } else {
        format!("{}:{}", urlencoding::encode(&user), urlencoding::encode(&password))
    };
    Ok(format!("mysql://{credentials}@{host}:{port}/{name}"))
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().with_context(|| format!("{key}={raw}"))
        },
        _ => Ok(default),
    }
}
