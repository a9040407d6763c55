//! Libraries repository: library rows and library_books association rows

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{book::Book, library::Library},
};

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool<Postgres>,
}

impl LibrariesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all libraries owned by a user
    pub async fn list_by_owner(&self, user_id: i32) -> AppResult<Vec<Library>> {
        let libraries = sqlx::query_as::<_, Library>(
            r#"
            SELECT id, name, user_id, private FROM libraries WHERE user_id = $1 ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(libraries)
    }

    /// Get a library by id regardless of owner
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Library>> {
        let library = sqlx::query_as::<_, Library>(
            r#"
            SELECT id, name, user_id, private FROM libraries WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(library)
    }

    /// Get a library only if it is owned by the given user
    pub async fn get_owned(&self, id: i32, user_id: i32) -> AppResult<Option<Library>> {
        let library = sqlx::query_as::<_, Library>(
            r#"
            SELECT id, name, user_id, private FROM libraries WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(library)
    }

    /// Create a new library
    pub async fn create(&self, user_id: i32, name: &str, private: bool) -> AppResult<Library> {
        let library = sqlx::query_as::<_, Library>(
            r#"
            INSERT INTO libraries (name, user_id, private)
            VALUES ($1, $2, $3)
            RETURNING id, name, user_id, private
            "#,
        )
        .bind(name)
        .bind(user_id)
        .bind(private)
        .fetch_one(&self.pool)
        .await?;

        Ok(library)
    }

    /// Rename a library, scoped to its owner. Returns None when the library
    /// does not exist or belongs to someone else.
    pub async fn rename(&self, id: i32, user_id: i32, name: &str) -> AppResult<Option<Library>> {
        let library = sqlx::query_as::<_, Library>(
            r#"
            UPDATE libraries SET name = $1
            WHERE id = $2 AND user_id = $3
            RETURNING id, name, user_id, private
            "#,
        )
        .bind(name)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(library)
    }

    /// Delete a library, scoped to its owner; association rows cascade.
    /// Returns false when nothing was deleted.
    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM libraries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a (library, book) pairing already exists
    pub async fn pairing_exists(&self, library_id: i32, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM library_books WHERE library_id = $1 AND book_id = $2)",
        )
        .bind(library_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Attach an existing book to a library with an optional initial rating
    pub async fn attach(&self, library_id: i32, book_id: i32, rating: Option<i32>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO library_books (library_id, book_id, rating) VALUES ($1, $2, $3)
            "#,
        )
        .bind(library_id)
        .bind(book_id)
        .bind(rating)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a catalog book and attach it to a library as one atomic unit
    pub async fn attach_new_book(
        &self,
        library_id: i32,
        title: &str,
        author: &str,
        genre: Option<&str>,
        published_year: Option<i32>,
        rating: Option<i32>,
    ) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

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
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO library_books (library_id, book_id, rating) VALUES ($1, $2, $3)
            "#,
        )
        .bind(library_id)
        .bind(book.id)
        .bind(rating)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(book)
    }

    /// Remove a book from a library. Returns false when the pairing did not exist.
    pub async fn detach(&self, library_id: i32, book_id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM library_books WHERE library_id = $1 AND book_id = $2",
        )
        .bind(library_id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the rating on every association row the given user holds for a
    /// book, across all of their libraries. Returns the number of rows touched.
    pub async fn rate_for_owner(&self, user_id: i32, book_id: i32, rating: i32) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE library_books SET rating = $1
            WHERE book_id = $2
              AND library_id IN (SELECT id FROM libraries WHERE user_id = $3)
            "#,
        )
        .bind(rating)
        .bind(book_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
