use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::header::ACCEPT;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetails, SearchParams, SearchResult},
};

pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";

/// Search hits kept after the popularity cut.
const SEARCH_LIMIT: usize = 10;

pub struct TmdbClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    image_base: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        access_token: String,
        base_url: String,
        image_base: String,
        rps: u32,
    ) -> AppResult<Self> {
        if access_token.trim().is_empty() {
            return Err(AppError::Configuration("TMDB access token is empty".to_string()));
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Ok(Self { client, access_token, base_url, image_base, limiter })
    }

    /// Searches the catalog by title. Keeps the ten most popular hits, newest release first.
    pub async fn search_movies(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> AppResult<Vec<SearchResult>> {
        let include_adult = if params.include_adult { "true" } else { "false" };
        let req = self
            .client
            .get(self.endpoint("search/movie"))
            .query(&[
                ("query", query),
                ("include_adult", include_adult),
                ("language", params.language.as_str()),
            ])
            .query(&[("page", params.page)]);

        let resp: SearchResponse = self.fetch(req).await?;
        debug!(query = %query, hits = resp.results.len(), "catalog search returned");

        Ok(rank_search_results(resp.results))
    }

    pub async fn movie_details(&self, external_id: i64, language: &str) -> AppResult<MovieDetails> {
        let req = self
            .client
            .get(self.endpoint(&format!("movie/{external_id}")))
            .query(&[("language", language)]);

        let resp: DetailsResponse = self.fetch(req).await?;
        debug!(external_id, title = %resp.original_title, "catalog details returned");

        Ok(MovieDetails {
            title: resp.original_title,
            poster_url: resp.poster_path.map(|path| poster_url(&self.image_base, &path)),
            release_date: resp.release_date.unwrap_or_default(),
            overview: resp.overview.unwrap_or_default(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn fetch<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> AppResult<T> {
        self.limiter.until_ready().await;

        let resp = req
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("catalog responded with {status}")));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| AppError::MalformedResponse(e.to_string()))
    }
}

/// Popularity cut first, then release date ordering within the survivors.
fn rank_search_results(mut movies: Vec<SearchMovie>) -> Vec<SearchResult> {
    movies.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    movies.truncate(SEARCH_LIMIT);

    let mut results: Vec<SearchResult> = movies
        .into_iter()
        .map(|m| SearchResult {
            title: m.original_title,
            external_id: m.id,
            vote_count: m.vote_count,
            release_date: m.release_date.unwrap_or_default(),
            overview: m.overview.unwrap_or_default(),
        })
        .collect();

    results.sort_by(|a, b| b.release_date.cmp(&a.release_date));
    results
}

pub fn poster_url(image_base: &str, poster_path: &str) -> String {
    format!("{image_base}{poster_path}")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchMovie>,
}

#[derive(Debug, Deserialize)]
struct SearchMovie {
    id: i64,
    original_title: String,
    #[serde(default)]
    popularity: f64,
    #[serde(default)]
    vote_count: i64,
    release_date: Option<String>,
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    original_title: String,
    poster_path: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
    };
    use serde_json::{Value, json};

    use super::*;

    /// Popularity and release date for fifteen search hits. The five newest films are
    /// also the five least popular, so a single newest-first sort would disagree with
    /// the expected order.
    const FIXTURE: [(&str, f64, &str); 15] = [
        ("Film A", 50.0, "2001-01-01"),
        ("Film B", 12.0, "2015-06-01"),
        ("Film C", 90.0, "1999-03-01"),
        ("Film D", 5.0, "2023-01-01"),
        ("Film E", 33.0, "2010-10-10"),
        ("Film F", 71.0, "2004-02-02"),
        ("Film G", 2.0, "2024-05-05"),
        ("Film H", 64.0, "2019-09-09"),
        ("Film I", 18.0, "1985-07-07"),
        ("Film J", 1.0, "2022-01-01"),
        ("Film K", 45.0, "2012-12-12"),
        ("Film L", 8.0, "2020-02-02"),
        ("Film M", 27.0, "2008-08-08"),
        ("Film N", 3.0, "2021-03-03"),
        ("Film O", 99.0, "1994-04-04"),
    ];

    pub(crate) fn search_fixture() -> Value {
        let results: Vec<Value> = FIXTURE
            .iter()
            .enumerate()
            .map(|(i, (title, popularity, date))| {
                json!({
                    "id": 100 + i as i64,
                    "original_title": title,
                    "title": title,
                    "popularity": popularity,
                    "vote_count": 10 * i as i64,
                    "release_date": date,
                    "overview": format!("{title} overview"),
                    "adult": false,
                })
            })
            .collect();
        json!({ "page": 1, "results": results, "total_pages": 1, "total_results": 15 })
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer test-token")
    }

    /// Minimal stand-in for the catalog API.
    pub(crate) fn fake_catalog() -> Router {
        Router::new()
            .route(
                "/search/movie",
                get(|headers: HeaderMap, Query(q): Query<std::collections::HashMap<String, String>>| async move {
                    if !authorized(&headers) {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    match q.get("query").map(String::as_str) {
                        Some("broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                        Some("garbled") => "<html>not json</html>".into_response(),
                        Some("empty") => Json(json!({ "page": 1, "results": [] })).into_response(),
                        Some("echo") => {
                            let param = |key: &str| q.get(key).cloned().unwrap_or_default();
                            let overview = format!(
                                "include_adult={} language={} page={}",
                                param("include_adult"),
                                param("language"),
                                param("page"),
                            );
                            Json(json!({ "page": 1, "results": [{
                                "id": 1,
                                "original_title": "Echo",
                                "popularity": 1.0,
                                "vote_count": 0,
                                "release_date": "2000-01-01",
                                "overview": overview,
                            }] }))
                            .into_response()
                        },
                        _ => Json(search_fixture()).into_response(),
                    }
                }),
            )
            .route(
                "/movie/{id}",
                get(|headers: HeaderMap, Path(id): Path<i64>, Query(q): Query<std::collections::HashMap<String, String>>| async move {
                    if !authorized(&headers) {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                    match id {
                        404 => StatusCode::NOT_FOUND.into_response(),
                        8 => Json(json!({
                            "id": 8,
                            "original_title": "Language Echo",
                            "poster_path": "/echo.jpg",
                            "release_date": "1999-01-01",
                            "overview": format!("language={}", q.get("language").cloned().unwrap_or_default()),
                        }))
                        .into_response(),
                        7 => Json(json!({
                            "id": 7,
                            "original_title": "No Poster",
                            "poster_path": null,
                            "release_date": "2020-01-01",
                            "overview": "Nothing to see.",
                        }))
                        .into_response(),
                        _ => Json(json!({
                            "id": id,
                            "original_title": format!("Movie {id}"),
                            "title": format!("Movie {id}"),
                            "poster_path": "/abc.jpg",
                            "release_date": "2001-12-07",
                            "overview": "Danny Ocean assembles a crew.",
                            "runtime": 116,
                        }))
                        .into_response(),
                    }
                }),
            )
    }

    pub(crate) async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub(crate) fn client_for(base_url: String, token: &str) -> TmdbClient {
        TmdbClient::new(
            reqwest::Client::new(),
            token.to_string(),
            base_url,
            DEFAULT_IMAGE_BASE.to_string(),
            100,
        )
        .unwrap()
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = TmdbClient::new(
            reqwest::Client::new(),
            "  ".to_string(),
            "http://localhost".to_string(),
            DEFAULT_IMAGE_BASE.to_string(),
            4,
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn poster_url_is_plain_concatenation() {
        assert_eq!(
            poster_url(DEFAULT_IMAGE_BASE, "/abc.jpg"),
            "https://image.tmdb.org/t/p/original/abc.jpg"
        );
    }

    #[test]
    fn ranking_keeps_input_order_for_equal_dates() {
        let movies = vec![
            SearchMovie {
                id: 1,
                original_title: "First".into(),
                popularity: 10.0,
                vote_count: 0,
                release_date: Some("2000-01-01".into()),
                overview: None,
            },
            SearchMovie {
                id: 2,
                original_title: "Second".into(),
                popularity: 5.0,
                vote_count: 0,
                release_date: Some("2000-01-01".into()),
                overview: None,
            },
            SearchMovie {
                id: 3,
                original_title: "Undated".into(),
                popularity: 1.0,
                vote_count: 0,
                release_date: None,
                overview: None,
            },
        ];
        let ids: Vec<i64> = rank_search_results(movies).iter().map(|r| r.external_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn search_takes_ten_most_popular_then_sorts_by_date() {
        let base = serve(fake_catalog()).await;
        let client = client_for(base, "test-token");

        let results = client.search_movies("ocean", &SearchParams::default()).await.unwrap();

        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Film H", "Film B", "Film K", "Film E", "Film M", "Film F", "Film A", "Film C",
                "Film O", "Film I",
            ]
        );
        assert_eq!(results[0].external_id, 107);
        assert_eq!(results[0].vote_count, 70);
        assert_eq!(results[0].overview, "Film H overview");
    }

    #[tokio::test]
    async fn search_parameters_reach_the_catalog() {
        let base = serve(fake_catalog()).await;
        let client = client_for(base, "test-token");

        let defaults = client.search_movies("echo", &SearchParams::default()).await.unwrap();
        assert_eq!(defaults[0].overview, "include_adult=false language=en-US page=1");

        let params = SearchParams { include_adult: true, language: "fr-FR".to_string(), page: 3 };
        let custom = client.search_movies("echo", &params).await.unwrap();
        assert_eq!(custom[0].overview, "include_adult=true language=fr-FR page=3");
    }

    #[tokio::test]
    async fn details_language_reaches_the_catalog() {
        let base = serve(fake_catalog()).await;
        let client = client_for(base, "test-token");

        let details = client.movie_details(8, "de-DE").await.unwrap();
        assert_eq!(details.overview, "language=de-DE");
    }

    #[tokio::test]
    async fn empty_search_returns_nothing() {
        let base = serve(fake_catalog()).await;
        let client = client_for(base, "test-token");

        let results = client.search_movies("empty", &SearchParams::default()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn details_builds_absolute_poster_url() {
        let base = serve(fake_catalog()).await;
        let client = client_for(base, "test-token");

        let details = client.movie_details(161, "en-US").await.unwrap();
        assert_eq!(details.title, "Movie 161");
        assert_eq!(details.poster_url.as_deref(), Some(format!("{DEFAULT_IMAGE_BASE}/abc.jpg").as_str()));
        assert_eq!(details.release_date, "2001-12-07");
    }

    #[tokio::test]
    async fn details_without_poster_has_no_url() {
        let base = serve(fake_catalog()).await;
        let client = client_for(base, "test-token");

        let details = client.movie_details(7, "en-US").await.unwrap();
        assert_eq!(details.poster_url, None);
    }

    #[tokio::test]
    async fn error_status_is_upstream_error() {
        let base = serve(fake_catalog()).await;
        let client = client_for(base, "test-token");

        let err = client.search_movies("broken", &SearchParams::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));

        let err = client.movie_details(404, "en-US").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn bad_credentials_are_upstream_error() {
        let base = serve(fake_catalog()).await;
        let client = client_for(base, "wrong-token");

        let err = client.search_movies("ocean", &SearchParams::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed_response() {
        let base = serve(fake_catalog()).await;
        let client = client_for(base, "test-token");

        let err = client.search_movies("garbled", &SearchParams::default()).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_catalog_is_upstream_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(format!("http://{addr}"), "test-token");

        let err = client.search_movies("ocean", &SearchParams::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
