//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, libraries};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookrack API",
        version = "0.3.0",
        description = "Personal Library Cataloging Service REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        auth::logout,
        auth::user_session,
        // Libraries
        libraries::list_libraries,
        libraries::create_library,
        libraries::get_library,
        libraries::rename_library,
        libraries::delete_library,
        libraries::add_book,
        libraries::rate_book,
        libraries::remove_book,
        // Books
        books::list_books,
        books::create_book,
        books::many_ratings,
        books::min_rating,
    ),
    components(
        schemas(
            // Auth
            auth::SessionResponse,
            crate::models::user::User,
            crate::models::user::SignupRequest,
            crate::models::user::LoginRequest,
            // Libraries
            crate::models::library::Library,
            crate::models::library::LibraryWithBooks,
            crate::models::library::CreateLibrary,
            crate::models::library::RenameLibrary,
            // Books
            crate::models::book::Book,
            crate::models::book::BookWithRating,
            crate::models::book::Rating,
            crate::models::book::CreateBook,
            crate::models::book::AddBookRequest,
            crate::models::book::SetRatingRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and session endpoints"),
        (name = "libraries", description = "Library and membership management"),
        (name = "books", description = "Shared book catalog")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
