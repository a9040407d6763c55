//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{published_year_is_valid, BookWithRating, CreateBook, UNKNOWN_AUTHOR},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books, annotated with the viewer's own rating and the
    /// global average (no viewer means no user rating)
    pub async fn list(&self, viewer: Option<i32>) -> AppResult<Vec<BookWithRating>> {
        self.repository.books.list_with_ratings(viewer).await
    }

    /// Create a global catalog book
    pub async fn create(&self, request: CreateBook, viewer: Option<i32>) -> AppResult<BookWithRating> {
        request.validate()?;

        if let Some(year) = request.published_year {
            if !published_year_is_valid(year) {
                return Err(AppError::Validation(
                    "Published year cannot be in the future".to_string(),
                ));
            }
        }

        let author = request.author.as_deref().unwrap_or(UNKNOWN_AUTHOR);

        let book = self
            .repository
            .books
            .create(
                request.title.trim(),
                author,
                request.genre.as_deref(),
                request.published_year,
            )
            .await?;

        tracing::info!("Catalog book created: '{}' (id={})", book.title, book.id);

        self.repository.books.get_with_ratings(book.id, viewer).await
    }

    /// Books rated by at least `count` library pairings
    pub async fn rated_by_at_least(
        &self,
        count: i64,
        viewer: Option<i32>,
    ) -> AppResult<Vec<BookWithRating>> {
        self.repository.books.rated_by_at_least(count, viewer).await
    }

    /// Books with at least one association rating >= `min`
    pub async fn with_min_rating(&self, min: i32, viewer: Option<i32>) -> AppResult<Vec<BookWithRating>> {
        self.repository.books.with_min_rating(min, viewer).await
    }

    /// Database connectivity probe for the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await?;
        Ok(())
    }
}
