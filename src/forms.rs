use serde::Deserialize;

use crate::error::{AppError, AppResult};

const NAME_MAX: usize = 30;
const REVIEW_MIN: usize = 6;
const REVIEW_MAX: usize = 100;
const RATING_MAX: f64 = 10.0;

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub name: String,
}

impl SearchForm {
    /// Returns the trimmed search term.
    pub fn validate(&self) -> AppResult<&str> {
        let name = self.name.trim();
        let len = name.chars().count();
        if len == 0 || len > NAME_MAX {
            return Err(AppError::Validation(format!(
                "Movie title must be between 1 and {NAME_MAX} characters."
            )));
        }
        Ok(name)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectForm {
    #[serde(default)]
    pub id: String,
}

impl SelectForm {
    pub fn validate(&self) -> AppResult<i64> {
        self.id
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("Missing movie id.".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RateForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub review: String,
}

#[derive(Debug, PartialEq)]
pub struct Rating {
    pub rating: f64,
    pub review: String,
}

impl RateForm {
    pub fn validate(&self) -> AppResult<Rating> {
        let rating: f64 = self
            .rating
            .trim()
            .parse()
            .ok()
            .filter(|r: &f64| (0.0..=RATING_MAX).contains(r))
            .ok_or_else(|| {
                AppError::Validation("Rating must be between 0 and 10.".to_string())
            })?;

        let review = self.review.trim();
        let len = review.chars().count();
        if !(REVIEW_MIN..=REVIEW_MAX).contains(&len) {
            return Err(AppError::Validation(format!(
                "Review must be between {REVIEW_MIN} and {REVIEW_MAX} characters."
            )));
        }

        Ok(Rating { rating, review: review.to_string() })
    }
}
