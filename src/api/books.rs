//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{BookWithRating, CreateBook},
};

use super::{AppJson, CurrentUser, MaybeUser};

/// List the whole catalog, annotated with the session's own rating (when
/// logged in) and the global average
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All catalog books", body = [BookWithRating])
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    MaybeUser(claims): MaybeUser,
) -> AppResult<Json<Vec<BookWithRating>>> {
    let viewer = claims.map(|c| c.user_id);
    let books = state.services.catalog.list(viewer).await?;
    Ok(Json(books))
}

/// Create a new global catalog book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookWithRating),
        (status = 400, description = "Missing title or invalid published year"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
    AppJson(payload): AppJson<CreateBook>,
) -> AppResult<(StatusCode, Json<BookWithRating>)> {
    let book = state
        .services
        .catalog
        .create(payload, Some(claims.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Books rated by at least `count` library pairings
#[utoipa::path(
    get,
    path = "/many_ratings/{count}",
    tag = "books",
    params(
        ("count" = i64, Path, description = "Minimum number of rated pairings")
    ),
    responses(
        (status = 200, description = "Books with enough ratings", body = [BookWithRating])
    )
)]
pub async fn many_ratings(
    State(state): State<crate::AppState>,
    MaybeUser(claims): MaybeUser,
    Path(count): Path<i64>,
) -> AppResult<Json<Vec<BookWithRating>>> {
    let viewer = claims.map(|c| c.user_id);
    let books = state.services.catalog.rated_by_at_least(count, viewer).await?;
    Ok(Json(books))
}

/// Books with at least one association rating >= `rating`
#[utoipa::path(
    get,
    path = "/min_rating/{rating}",
    tag = "books",
    params(
        ("rating" = i32, Path, description = "Rating threshold")
    ),
    responses(
        (status = 200, description = "Books meeting the threshold", body = [BookWithRating])
    )
)]
pub async fn min_rating(
    State(state): State<crate::AppState>,
    MaybeUser(claims): MaybeUser,
    Path(rating): Path<i32>,
) -> AppResult<Json<Vec<BookWithRating>>> {
    let viewer = claims.map(|c| c.user_id);
    let books = state.services.catalog.with_min_rating(rating, viewer).await?;
    Ok(Json(books))
}
