//! Library management service: ownership checks, membership and ratings

use validator::Validate;

use crate::{
    error::{is_unique_violation, validation_message, AppError, AppResult},
    models::{
        book::{published_year_is_valid, AddBookRequest, BookWithRating, SetRatingRequest, UNKNOWN_AUTHOR},
        library::{CreateLibrary, Library, LibraryWithBooks, RenameLibrary},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LibrariesService {
    repository: Repository,
}

impl LibrariesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List the user's own libraries with their books and rating context
    pub async fn list(&self, user_id: i32) -> AppResult<Vec<LibraryWithBooks>> {
        let libraries = self.repository.libraries.list_by_owner(user_id).await?;

        let mut hydrated = Vec::with_capacity(libraries.len());
        for library in libraries {
            let books = self
                .repository
                .books
                .for_library(library.id, Some(user_id))
                .await?;
            hydrated.push(LibraryWithBooks::new(library, books));
        }

        Ok(hydrated)
    }

    /// Create a library owned by the user
    pub async fn create(&self, user_id: i32, request: CreateLibrary) -> AppResult<Library> {
        request
            .validate()
            .map_err(|e| AppError::BusinessRule(validation_message(&e)))?;

        self.repository
            .libraries
            .create(user_id, &request.name, request.private.unwrap_or(false))
            .await
    }

    /// Fetch a library by id. Owners always see their own; everyone else
    /// sees it only when it is not private. A private library of another
    /// user reads as not-found so its existence is not leaked.
    pub async fn get_visible(&self, id: i32, viewer_id: i32) -> AppResult<LibraryWithBooks> {
        let library = self
            .repository
            .libraries
            .get_by_id(id)
            .await?
            .filter(|l| !l.private || l.user_id == viewer_id)
            .ok_or_else(|| AppError::NotFound("Library not found".to_string()))?;

        let books = self
            .repository
            .books
            .for_library(library.id, Some(viewer_id))
            .await?;

        Ok(LibraryWithBooks::new(library, books))
    }

    /// Rename a library, owner-only
    pub async fn rename(&self, user_id: i32, id: i32, request: RenameLibrary) -> AppResult<Library> {
        request
            .validate()
            .map_err(|e| AppError::BusinessRule(validation_message(&e)))?;

        self.repository
            .libraries
            .rename(id, user_id, &request.name)
            .await?
            .ok_or_else(|| AppError::NotFound("Library not found".to_string()))
    }

    /// Delete a library, owner-only; association rows cascade with it
    pub async fn delete(&self, user_id: i32, id: i32) -> AppResult<()> {
        let deleted = self.repository.libraries.delete(id, user_id).await?;
        if !deleted {
            return Err(AppError::NotFound("Library not found".to_string()));
        }

        tracing::info!("Library {} deleted by user {}", id, user_id);
        Ok(())
    }

    /// Add a book to a library, owner-only. A supplied `book_id` must
    /// resolve to an existing catalog book and takes precedence over any
    /// inline fields; without one, inline fields create the book and attach
    /// it in a single transaction.
    pub async fn add_book(
        &self,
        user_id: i32,
        library_id: i32,
        request: AddBookRequest,
    ) -> AppResult<BookWithRating> {
        request.validate()?;

        self.repository
            .libraries
            .get_owned(library_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Library not found".to_string()))?;

        let book_id = match request.book_id {
            Some(book_id) => {
                let book = self
                    .repository
                    .books
                    .get_by_id(book_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

                if self
                    .repository
                    .libraries
                    .pairing_exists(library_id, book.id)
                    .await?
                {
                    return Err(AppError::Conflict("Book already in library".to_string()));
                }

                match self
                    .repository
                    .libraries
                    .attach(library_id, book.id, request.rating)
                    .await
                {
                    Ok(()) => {}
                    Err(AppError::Database(err)) if is_unique_violation(&err) => {
                        return Err(AppError::Conflict("Book already in library".to_string()));
                    }
                    Err(err) => return Err(err),
                }

                book.id
            }
            None => {
                let title = request
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| AppError::Validation("Title is required".to_string()))?;

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
                    .libraries
                    .attach_new_book(
                        library_id,
                        title,
                        author,
                        request.genre.as_deref(),
                        request.published_year,
                        request.rating,
                    )
                    .await?;

                tracing::info!("Book '{}' created and attached to library {}", book.title, library_id);
                book.id
            }
        };

        self.repository
            .books
            .get_with_ratings(book_id, Some(user_id))
            .await
    }

    /// Set the rating for a book the user holds, owner-only on the library.
    /// The rating applies to every association row the user holds for that
    /// book across their own libraries.
    pub async fn rate_book(
        &self,
        user_id: i32,
        library_id: i32,
        book_id: i32,
        request: SetRatingRequest,
    ) -> AppResult<BookWithRating> {
        let rating = request
            .rating
            .ok_or_else(|| AppError::Validation("Rating is required".to_string()))?;

        if !(1..=5).contains(&rating) {
            return Err(AppError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        self.repository
            .libraries
            .get_owned(library_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Library not found".to_string()))?;

        if !self
            .repository
            .libraries
            .pairing_exists(library_id, book_id)
            .await?
        {
            return Err(AppError::NotFound("Book not in library".to_string()));
        }

        self.repository
            .libraries
            .rate_for_owner(user_id, book_id, rating)
            .await?;

        self.repository
            .books
            .get_with_ratings(book_id, Some(user_id))
            .await
    }

    /// Remove a book from a library, owner-only
    pub async fn remove_book(&self, user_id: i32, library_id: i32, book_id: i32) -> AppResult<()> {
        self.repository
            .libraries
            .get_owned(library_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Library not found".to_string()))?;

        let detached = self.repository.libraries.detach(library_id, book_id).await?;
        if !detached {
            return Err(AppError::NotFound("Book not in library".to_string()));
        }

        Ok(())
    }
}
