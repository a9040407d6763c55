//! Books repository: the shared catalog and its derived rating views

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookRatingRow, BookWithRating},
};

/// Shared select for a book annotated with the viewer's own rating and the
/// global average. `$1` binds the viewer's user id (NULL for no session, in
/// which case the user-rating subquery matches nothing).
const BOOK_WITH_RATING: &str = r#"
SELECT b.id, b.title, b.author, b.genre, b.published_year,
       (SELECT lb.rating
          FROM library_books lb
          JOIN libraries l ON l.id = lb.library_id
         WHERE lb.book_id = b.id AND l.user_id = $1 AND lb.rating IS NOT NULL
         LIMIT 1) AS user_rating,
       (SELECT AVG(lb.rating)::float8
          FROM library_books lb
         WHERE lb.book_id = b.id) AS global_rating
  FROM books b
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a bare book record by id
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, genre, published_year FROM books WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Create a new catalog book
    pub async fn create(
        &self,
        title: &str,
        author: &str,
        genre: Option<&str>,
        published_year: Option<i32>,
    ) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, genre, published_year)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, author, genre, published_year
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(genre)
        .bind(published_year)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    /// List the whole catalog annotated with rating context for the viewer
    pub async fn list_with_ratings(&self, viewer: Option<i32>) -> AppResult<Vec<BookWithRating>> {
        let query = format!("{} ORDER BY b.id", BOOK_WITH_RATING);

        let rows = sqlx::query_as::<_, BookRatingRow>(&query)
            .bind(viewer)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BookWithRating::from).collect())
    }

    /// Get one book annotated with rating context for the viewer
    pub async fn get_with_ratings(&self, id: i32, viewer: Option<i32>) -> AppResult<BookWithRating> {
        let query = format!("{} WHERE b.id = $2", BOOK_WITH_RATING);

        let row = sqlx::query_as::<_, BookRatingRow>(&query)
            .bind(viewer)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(BookWithRating::from(row))
    }

    /// Books attached to one library, annotated for the viewer
    pub async fn for_library(
        &self,
        library_id: i32,
        viewer: Option<i32>,
    ) -> AppResult<Vec<BookWithRating>> {
        let query = format!(
            "{} WHERE b.id IN (SELECT book_id FROM library_books WHERE library_id = $2) ORDER BY b.id",
            BOOK_WITH_RATING
        );

        let rows = sqlx::query_as::<_, BookRatingRow>(&query)
            .bind(viewer)
            .bind(library_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BookWithRating::from).collect())
    }

    /// Books rated by at least `count` library pairings
    pub async fn rated_by_at_least(
        &self,
        count: i64,
        viewer: Option<i32>,
    ) -> AppResult<Vec<BookWithRating>> {
        let query = format!(
            r#"{} WHERE (SELECT COUNT(*) FROM library_books lb
                          WHERE lb.book_id = b.id AND lb.rating IS NOT NULL) >= $2
                 ORDER BY b.id"#,
            BOOK_WITH_RATING
        );

        let rows = sqlx::query_as::<_, BookRatingRow>(&query)
            .bind(viewer)
            .bind(count)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BookWithRating::from).collect())
    }

    /// Books with at least one association rating >= `min`
    pub async fn with_min_rating(
        &self,
        min: i32,
        viewer: Option<i32>,
    ) -> AppResult<Vec<BookWithRating>> {
        let query = format!(
            r#"{} WHERE EXISTS (SELECT 1 FROM library_books lb
                                 WHERE lb.book_id = b.id AND lb.rating >= $2)
                 ORDER BY b.id"#,
            BOOK_WITH_RATING
        );

        let rows = sqlx::query_as::<_, BookRatingRow>(&query)
            .bind(viewer)
            .bind(min)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BookWithRating::from).collect())
    }
}
