use std::net::SocketAddr;

use anyhow::Context;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub tmdb_access_token: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base: String,
    pub tmdb_rps: u32,
    pub http_timeout_secs: u64,
    pub database_url: String,
    pub secret_key: Option<String>,
    pub search_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup so it can be exercised without touching the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT").unwrap_or_else(|| "5001".to_string()).parse().context("PORT")?;

        let tmdb_access_token =
            lookup("TMDB_API_READ_ONLY").map(|s| s.trim().to_string()).unwrap_or_default();
        if tmdb_access_token.is_empty() {
            return Err(AppError::Configuration(
                "TMDB_API_READ_ONLY must be set to a TMDB read access token".to_string(),
            )
            .into());
        }

        let tmdb_base_url =
            lookup("TMDB_BASE_URL").unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());
        let tmdb_image_base = lookup("TMDB_IMAGE_BASE")
            .unwrap_or_else(|| crate::tmdb::DEFAULT_IMAGE_BASE.to_string());

        let tmdb_rps: u32 = lookup("TMDB_RPS").and_then(|s| s.parse().ok()).unwrap_or(4);
        let http_timeout_secs: u64 =
            lookup("HTTP_TIMEOUT_SECS").and_then(|s| s.parse().ok()).unwrap_or(30);

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://movies.db?mode=rwc".to_string());

        let secret_key = lookup("SECRET_KEY").filter(|s| !s.trim().is_empty());

        let search_ttl_secs: i64 =
            lookup("SEARCH_TTL_SECS").and_then(|s| s.parse().ok()).unwrap_or(600);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            tmdb_access_token,
            tmdb_base_url,
            tmdb_image_base,
            tmdb_rps,
            http_timeout_secs,
            database_url,
            secret_key,
            search_ttl_secs,
        })
    }
}
