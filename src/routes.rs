use axum::{
    Router,
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::SignedCookieJar;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::{
    AppState,
    error::{AppError, AppResult},
    forms::{Rating, RateForm, SearchForm, SelectForm},
    models::{DEFAULT_LANGUAGE, InsertOutcome, SearchParams},
    session, templates,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add", get(add_form).post(add_search))
        .route("/select", get(select_list).post(select_movie))
        .route("/movie-details/{id}", get(movie_details))
        .route("/edit/{id}", get(edit_form).post(edit_submit))
        .route("/delete/{id}", post(delete_movie))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let movies = state.store.list_top_movies().await?;
    let (jar, flash) = session::take_flash(jar);
    Ok((jar, Html(templates::index_page(&movies, flash.as_deref()))))
}

pub async fn add_form() -> Html<String> {
    Html(templates::add_page("", None))
}

pub async fn add_search(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<SearchForm>,
) -> Response {
    let name = match form.validate() {
        Ok(name) => name,
        Err(err) => return render_add(&form.name, &err),
    };

    match state.tmdb.search_movies(name, &SearchParams::default()).await {
        Ok(results) => {
            let (jar, sid) = session::ensure_session(jar);
            debug!(query = %name, results = results.len(), "stashing search results");
            state.stash.put(&sid, results);
            debug!(sessions = state.stash.len(), "search stash size");
            (jar, Redirect::to("/select")).into_response()
        },
        Err(err @ (AppError::Upstream(_) | AppError::MalformedResponse(_))) => {
            warn!(query = %name, error = %err, "catalog search failed");
            render_add(name, &err)
        },
        Err(err) => err.into_response(),
    }
}

fn render_add(name: &str, err: &AppError) -> Response {
    let body = templates::add_page(name, Some(&err.public_message()));
    (err.status(), Html(body)).into_response()
}

pub async fn select_list(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let results = session::session_id(&jar).and_then(|sid| state.stash.take(&sid));

    match results {
        Some(results) => Html(templates::select_page(&results)).into_response(),
        None => {
            let body = templates::message_page(
                "No search results",
                "Search results were not found or have expired.",
            );
            (StatusCode::NOT_FOUND, Html(body)).into_response()
        },
    }
}

pub async fn select_movie(Form(form): Form<SelectForm>) -> AppResult<Redirect> {
    let id = form.validate()?;
    Ok(Redirect::to(&format!("/movie-details/{id}")))
}

pub async fn movie_details(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(external_id): Path<i64>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let details = state.tmdb.movie_details(external_id, DEFAULT_LANGUAGE).await?;

    match state.store.insert(details).await? {
        InsertOutcome::Created(movie) => {
            let jar = session::set_flash(jar, "Movie added successfully.");
            Ok((jar, Redirect::to(&format!("/edit/{}", movie.id))))
        },
        InsertOutcome::Duplicate(existing) => {
            debug!(id = existing.id, external_id, "selected movie is already listed");
            let jar = session::set_flash(jar, "Movie already exists in DB.");
            Ok((jar, Redirect::to("/")))
        },
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Html<String>> {
    let movie = state.store.find_by_id(id).await?.ok_or_else(|| AppError::not_found("movie"))?;

    let rating = movie.rating.map(|r| r.to_string()).unwrap_or_default();
    let review = movie.review.clone().unwrap_or_default();
    Ok(Html(templates::edit_page(&movie, &rating, &review, None)))
}

pub async fn edit_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
    Form(form): Form<RateForm>,
) -> AppResult<Response> {
    match form.validate() {
        Ok(Rating { rating, review }) => {
            state.store.update_rating(id, rating, review).await?;
            let jar = session::set_flash(jar, "Movie has been updated!");
            Ok((jar, Redirect::to("/")).into_response())
        },
        Err(err) => {
            let movie =
                state.store.find_by_id(id).await?.ok_or_else(|| AppError::not_found("movie"))?;
            let body = templates::edit_page(
                &movie,
                &form.rating,
                &form.review,
                Some(&err.public_message()),
            );
            Ok((err.status(), Html(body)).into_response())
        },
    }
}

pub async fn delete_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(id): Path<i32>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let deleted = state.store.delete_by_id(id).await?;
    let jar = session::set_flash(jar, &format!("Removed {}.", deleted.title));
    Ok((jar, Redirect::to("/")))
}
