//! Book catalog model and rating types.
//!
//! Books are global records shared by every user; the per-pairing rating
//! lives on the library_books association row. The two derived rating
//! fields (the requesting user's own rating and the global average) are
//! computed per request and never stored.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Author recorded when a book is created without one
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Book record from the shared catalog
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
}

/// Add a book to a library: either by id, or by inline book fields
/// (title required) which create the catalog record on the fly.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddBookRequest {
    /// Existing catalog book id; takes precedence over inline fields
    pub book_id: Option<i32>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
    /// Optional initial rating for the new pairing
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
}

/// Set the rating on a library/book pairing
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRatingRequest {
    pub rating: Option<i32>,
}

/// Derived rating context for a book, computed at response time
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Rating on the association row in one of the requesting user's libraries
    pub user_rating: Option<i32>,
    /// Mean of all non-null ratings across every association, 2 decimals
    pub global_rating: Option<f64>,
}

/// Internal row structure for catalog queries with derived rating columns
#[derive(Debug, Clone, FromRow)]
pub struct BookRatingRow {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
    pub user_rating: Option<i32>,
    pub global_rating: Option<f64>,
}

/// Book serialized with its request-scoped rating context
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookWithRating {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
    pub rating: Rating,
}

impl From<BookRatingRow> for BookWithRating {
    fn from(row: BookRatingRow) -> Self {
        BookWithRating {
            id: row.id,
            title: row.title,
            author: row.author,
            genre: row.genre,
            published_year: row.published_year,
            rating: Rating {
                user_rating: row.user_rating,
                global_rating: row.global_rating.map(round2),
            },
        }
    }
}

/// Round a mean rating to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A published year may not lie in the future
pub fn published_year_is_valid(year: i32) -> bool {
    year <= Utc::now().year()
}
