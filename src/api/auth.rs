//! Authentication endpoints: signup, login, logout and session check

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        library::LibraryWithBooks,
        user::{LoginRequest, SignupRequest, User},
    },
};

use super::{AppJson, CurrentUser, SESSION_COOKIE};

/// Session check response: the current user plus their hydrated libraries
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: User,
    pub libraries: Vec<LibraryWithBooks>,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .build()
}

/// Register a new user and open a session
#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing or invalid field"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<User>)> {
    let (token, user) = state.services.auth.signup(payload).await?;

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token)),
        Json(user),
    ))
}

/// Authenticate and open a session
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = User),
        (status = 401, description = "Unknown user or wrong password")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<User>)> {
    let (token, user) = state.services.auth.login(payload).await?;

    Ok((jar.add(session_cookie(token)), Json(user)))
}

/// Close the session. Clears the cookie unconditionally and is idempotent.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Session cleared")
    )
)]
pub async fn logout(jar: CookieJar) -> (StatusCode, CookieJar, ()) {
    (
        StatusCode::NO_CONTENT,
        jar.remove(expired_session_cookie()),
        (),
    )
}

/// Return the current user and their libraries for state rehydration
#[utoipa::path(
    get,
    path = "/user_session",
    tag = "auth",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn user_session(
    State(state): State<crate::AppState>,
    CurrentUser(claims): CurrentUser,
) -> AppResult<Json<SessionResponse>> {
    let (user, libraries) = state.services.auth.session(claims.user_id).await?;

    Ok(Json(SessionResponse { user, libraries }))
}
