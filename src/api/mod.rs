//! API handlers for Bookrack REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod libraries;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use axum_extra::extract::CookieJar;

use crate::{error::AppError, models::user::SessionClaims, AppState};

/// Name of the session cookie set by signup/login
pub const SESSION_COOKIE: &str = "bookrack_session";

/// Extractor for the authenticated user from the session cookie.
/// Handlers taking this extractor sit behind the authentication gate.
pub struct CurrentUser(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let cookie = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| AppError::Authentication("Missing session cookie".to_string()))?;

        let claims = SessionClaims::from_token(cookie.value(), &state.config.auth.session_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired session".to_string()))?;

        Ok(CurrentUser(claims))
    }
}

/// JSON body extractor that renders rejections (malformed body, missing
/// fields) through [`AppError`], keeping every error in the API's
/// `{"error": ...}` shape.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(AppJson(value))
    }
}

/// Optional variant of [`CurrentUser`] for public endpoints that still
/// annotate responses with session context when one is present.
pub struct MaybeUser(pub Option<SessionClaims>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let claims = jar.get(SESSION_COOKIE).and_then(|cookie| {
            SessionClaims::from_token(cookie.value(), &state.config.auth.session_secret).ok()
        });

        Ok(MaybeUser(claims))
    }
}
