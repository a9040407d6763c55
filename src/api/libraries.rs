//! Library endpoints: collection, item, membership and ratings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{AddBookRequest, BookWithRating, SetRatingRequest},
        library::{CreateLibrary, Library, LibraryWithBooks, RenameLibrary},
    },
};

use super::{AppJson, CurrentUser};

/// List the current user's libraries
#[utoipa::path(
    get,
    path = "/libraries",
    tag = "libraries",
    responses(
        (status = 200, description = "Libraries owned by the current user", body = [LibraryWithBooks]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_libraries(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
) -> AppResult<Json<Vec<LibraryWithBooks>>> {
    let libraries = state.services.libraries.list(claims.user_id).await?;
    Ok(Json(libraries))
}

/// Create a new library
#[utoipa::path(
    post,
    path = "/libraries",
    tag = "libraries",
    request_body = CreateLibrary,
    responses(
        (status = 201, description = "Library created", body = Library),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Invalid library name")
    )
)]
pub async fn create_library(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
    AppJson(payload): AppJson<CreateLibrary>,
) -> AppResult<(StatusCode, Json<Library>)> {
    let library = state.services.libraries.create(claims.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(library)))
}

/// Fetch a library by id. Owners always see their own; private libraries
/// of other users read as not-found.
#[utoipa::path(
    get,
    path = "/libraries/{id}",
    tag = "libraries",
    params(
        ("id" = i32, Path, description = "Library ID")
    ),
    responses(
        (status = 200, description = "Library with its books", body = LibraryWithBooks),
        (status = 404, description = "Library not found or not visible")
    )
)]
pub async fn get_library(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LibraryWithBooks>> {
    let library = state.services.libraries.get_visible(id, claims.user_id).await?;
    Ok(Json(library))
}

/// Rename a library (partial update), owner-only
#[utoipa::path(
    patch,
    path = "/libraries/{id}",
    tag = "libraries",
    params(
        ("id" = i32, Path, description = "Library ID")
    ),
    request_body = RenameLibrary,
    responses(
        (status = 200, description = "Library renamed", body = Library),
        (status = 404, description = "Library not found or not owned")
    )
)]
pub async fn rename_library(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RenameLibrary>,
) -> AppResult<Json<Library>> {
    let library = state
        .services
        .libraries
        .rename(claims.user_id, id, payload)
        .await?;
    Ok(Json(library))
}

/// Delete a library, owner-only; cascades its association rows
#[utoipa::path(
    delete,
    path = "/libraries/{id}",
    tag = "libraries",
    params(
        ("id" = i32, Path, description = "Library ID")
    ),
    responses(
        (status = 204, description = "Library deleted"),
        (status = 404, description = "Library not found or not owned")
    )
)]
pub async fn delete_library(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.libraries.delete(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a book to a library: an existing one by id, or a new catalog book
/// from inline fields
#[utoipa::path(
    post,
    path = "/libraries/{id}/books",
    tag = "libraries",
    params(
        ("id" = i32, Path, description = "Library ID")
    ),
    request_body = AddBookRequest,
    responses(
        (status = 201, description = "Book attached", body = BookWithRating),
        (status = 400, description = "Missing title or invalid rating"),
        (status = 404, description = "Library or book not found"),
        (status = 409, description = "Book already in library")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AddBookRequest>,
) -> AppResult<(StatusCode, Json<BookWithRating>)> {
    let book = state
        .services
        .libraries
        .add_book(claims.user_id, id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Set the rating for a (library, book) pairing. Applies to every
/// association row the current user holds for that book.
#[utoipa::path(
    patch,
    path = "/libraries/{library_id}/books/{book_id}",
    tag = "libraries",
    params(
        ("library_id" = i32, Path, description = "Library ID"),
        ("book_id" = i32, Path, description = "Book ID")
    ),
    request_body = SetRatingRequest,
    responses(
        (status = 200, description = "Rating updated", body = BookWithRating),
        (status = 400, description = "Missing or out-of-range rating"),
        (status = 404, description = "Library or pairing not found")
    )
)]
pub async fn rate_book(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
    Path((library_id, book_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<SetRatingRequest>,
) -> AppResult<Json<BookWithRating>> {
    let book = state
        .services
        .libraries
        .rate_book(claims.user_id, library_id, book_id, payload)
        .await?;
    Ok(Json(book))
}

/// Remove a book from a library, owner-only
#[utoipa::path(
    delete,
    path = "/libraries/{library_id}/books/{book_id}",
    tag = "libraries",
    params(
        ("library_id" = i32, Path, description = "Library ID"),
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book removed from library"),
        (status = 404, description = "Library or pairing not found")
    )
)]
pub async fn remove_book(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
    Path((library_id, book_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    state
        .services
        .libraries
        .remove_book(claims.user_id, library_id, book_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
