//! Library model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookWithRating;

/// Library record: a user-owned named collection of books
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Library {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    /// When true, visible to the owner only
    pub private: bool,
}

/// Create library request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLibrary {
    #[validate(length(min = 3, max = 100, message = "Library name must be 3-100 characters"))]
    pub name: String,
    pub private: Option<bool>,
}

/// Rename library request (partial update)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameLibrary {
    #[validate(length(min = 3, max = 100, message = "Library name must be 3-100 characters"))]
    pub name: String,
}

/// Library serialized with its books and their rating context
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LibraryWithBooks {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub private: bool,
    pub books: Vec<BookWithRating>,
}

impl LibraryWithBooks {
    pub fn new(library: Library, books: Vec<BookWithRating>) -> Self {
        Self {
            id: library.id,
            name: library.name,
            user_id: library.user_id,
            private: library.private,
            books,
        }
    }
}
