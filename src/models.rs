use serde::{Deserialize, Serialize};

use crate::entities::movie;

/// One catalog search hit, projected down to what the selection page needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub external_id: i64,
    pub vote_count: i64,
    pub release_date: String,
    pub overview: String,
}

#[derive(Clone, Debug)]
pub struct SearchParams {
    pub include_adult: bool,
    pub language: String,
    pub page: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self { include_adult: false, language: DEFAULT_LANGUAGE.to_string(), page: 1 }
    }
}

pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Catalog detail record ready to be inserted into the local list.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieDetails {
    pub title: String,
    pub poster_url: Option<String>,
    pub release_date: String,
    pub overview: String,
}

#[derive(Debug)]
pub enum InsertOutcome {
    Created(movie::Model),
    Duplicate(movie::Model),
}
