mod config;
mod db;
mod entities;
mod error;
mod forms;
mod models;
mod routes;
mod session;
mod store;
mod templates;
mod tmdb;

use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{config::Config, session::SearchStash, store::MovieStore, tmdb::TmdbClient};

/// Shortest secret accepted for cookie key derivation.
const MIN_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct AppState {
    pub store: MovieStore,
    pub tmdb: Arc<TmdbClient>,
    pub stash: SearchStash,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,reelrank=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .user_agent("reelrank/0.1")
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_access_token.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_image_base.clone(),
        config.tmdb_rps,
    )?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = MovieStore::new(db);
    tracing::info!(movies = store.count().await?, "store ready");

    let state = AppState {
        store,
        tmdb: Arc::new(tmdb),
        stash: SearchStash::new(config.search_ttl_secs),
        cookie_key: cookie_key(config.secret_key.as_deref()),
    };

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) if secret.len() >= MIN_SECRET_LEN => Key::derive_from(secret.as_bytes()),
        Some(_) => {
            tracing::warn!(
                min_len = MIN_SECRET_LEN,
                "SECRET_KEY too short, using a random key; sessions will not survive restarts"
            );
            Key::generate()
        },
        None => {
            tracing::warn!("SECRET_KEY not set, using a random key; sessions will not survive restarts");
            Key::generate()
        },
    }
}
