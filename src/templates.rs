use maud::{DOCTYPE, Markup, html};

use crate::{entities::movie, models::SearchResult};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn index_page(movies: &[movie::Model], flash: Option<&str>) -> String {
    page(
        "My Top 10 Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-4xl mx-auto px-6 py-10" {
                    div class="flex items-start justify-between gap-6" {
                        div {
                            h1 class="text-3xl font-bold text-gray-900" { "My Top 10 Movies" }
                            p class="mt-2 text-gray-600" { "These are my all-time favourite movies." }
                        }
                        a class="rounded-md bg-blue-600 px-4 py-2 text-sm font-semibold text-white hover:bg-blue-700" href="/add" { "Add movie" }
                    }

                    (flash_banner(flash))

                    @if movies.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies yet. Search for one to get started." }
                        }
                    } @else {
                        div class="mt-10 space-y-4" {
                            @for movie in movies {
                                (movie_card(movie))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn add_page(name: &str, error: Option<&str>) -> String {
    page(
        "Add Movie",
        narrow(html! {
            h1 class="text-3xl font-bold text-gray-900" { "Add a movie" }
            p class="mt-2 text-gray-600" { "Search the catalog by title." }
            (error_banner(error))

            form class="mt-8 space-y-6" method="post" action="/add" {
                div {
                    label class="block text-sm font-medium text-gray-700" for="name" { "Movie Title" }
                    input class=(INPUT_CLASS) name="name" id="name" value=(name) placeholder="Ex: Ocean's Eleven" minlength="1" maxlength="30" required;
                }
                button class=(BUTTON_CLASS) type="submit" { "Submit" }
            }
        }),
    )
}

pub fn select_page(results: &[SearchResult]) -> String {
    page(
        "Select Movie",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-3xl mx-auto px-6 py-10" {
                    div class="flex items-start justify-between gap-6" {
                        h1 class="text-3xl font-bold text-gray-900" { "Select a movie" }
                        a class="text-sm text-blue-600 hover:text-blue-800" href="/add" { "New search" }
                    }

                    @if results.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No matches. Try a different title." }
                        }
                    } @else {
                        ul class="mt-10 space-y-3" {
                            @for result in results {
                                li class="bg-white shadow rounded-lg p-4" {
                                    form method="post" action="/select" class="flex items-start justify-between gap-4" {
                                        input type="hidden" name="id" value=(result.external_id);
                                        div {
                                            p class="font-semibold text-gray-900" {
                                                (result.title)
                                                @if !result.release_date.is_empty() {
                                                    span class="ml-2 font-normal text-gray-500" { "(" (result.release_date) ")" }
                                                }
                                            }
                                            p class="mt-1 text-sm text-gray-600" { (result.overview) }
                                            p class="mt-1 text-xs text-gray-400" { (result.vote_count) " votes" }
                                        }
                                        button class="shrink-0 rounded-md border border-blue-600 px-3 py-1 text-sm text-blue-600 hover:bg-blue-50" type="submit" { "Select" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn edit_page(movie: &movie::Model, rating: &str, review: &str, error: Option<&str>) -> String {
    page(
        "Rate Movie",
        narrow(html! {
            h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
            p class="mt-2 text-gray-600" { "Edit movie rating" }
            (error_banner(error))

            form class="mt-8 space-y-6" method="post" action=(format!("/edit/{}", movie.id)) {
                div {
                    label class="block text-sm font-medium text-gray-700" for="rating" { "Your rating out of 10 e.g. 7.5" }
                    input class=(INPUT_CLASS) name="rating" id="rating" type="number" min="0" max="10" step="0.1" value=(rating) placeholder="Enter your rating here..." required;
                }
                div {
                    label class="block text-sm font-medium text-gray-700" for="review" { "Your Review" }
                    input class=(INPUT_CLASS) name="review" id="review" value=(review) minlength="6" maxlength="100" placeholder="Enter your review here..." required;
                }
                button class=(BUTTON_CLASS) type="submit" { "Submit" }
            }
        }),
    )
}

pub fn message_page(title: &str, message: &str) -> String {
    page(
        title,
        narrow(html! {
            h1 class="text-2xl font-bold text-gray-900" { (title) }
            p class="mt-4 text-gray-700" { (message) }
            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/add" { "Search again" }
        }),
    )
}

pub fn error_page(message: &str) -> String {
    page(
        "Error",
        narrow(html! {
            h1 class="text-2xl font-bold text-gray-900" { "Error" }
            p class="mt-4 text-gray-700" { (message) }
            a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
        }),
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn narrow(inner: Markup) -> Markup {
    html! {
        div class="min-h-screen bg-gray-50" {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" { (inner) }
            }
        }
    }
}

fn flash_banner(flash: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = flash {
            div class="mt-6 rounded-md border border-blue-200 bg-blue-50 px-4 py-3 text-sm text-blue-800" { (message) }
        }
    }
}

fn error_banner(error: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = error {
            div class="mt-6 rounded-md border border-red-200 bg-red-50 px-4 py-3 text-sm text-red-800" { (message) }
        }
    }
}

fn movie_card(movie: &movie::Model) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" {
            @if let Some(poster) = &movie.poster_url {
                img class="w-24 shrink-0 rounded" src=(poster) alt=(movie.title);
            } @else {
                div class="w-24 h-36 shrink-0 rounded bg-gray-200" {}
            }

            div class="flex-1" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        @if let Some(rank) = movie.rank {
                            span class="mr-2 text-gray-400" { "#" (rank) }
                        }
                        (movie.title)
                        @if !movie.release_date.is_empty() {
                            span class="ml-2 font-normal text-gray-500" { "(" (release_year(&movie.release_date)) ")" }
                        }
                    }
                    @if let Some(rating) = movie.rating {
                        span class="rounded bg-yellow-100 px-2 py-1 text-sm font-semibold text-yellow-800" { (format!("{rating:.1}")) }
                    }
                }

                @if let Some(review) = &movie.review {
                    p class="mt-2 italic text-gray-700" { "\"" (review) "\"" }
                }
                p class="mt-2 text-sm text-gray-600" { (movie.overview) }

                div class="mt-4 flex gap-3" {
                    a class="rounded-md border border-blue-600 px-3 py-1 text-sm text-blue-600 hover:bg-blue-50" href=(format!("/edit/{}", movie.id)) { "Update" }
                    form method="post" action=(format!("/delete/{}", movie.id)) {
                        button class="rounded-md border border-red-600 px-3 py-1 text-sm text-red-600 hover:bg-red-50" type="submit" { "Delete" }
                    }
                }
            }
        }
    }
}

fn release_year(release_date: &str) -> &str {
    release_date.split('-').next().unwrap_or(release_date)
}
