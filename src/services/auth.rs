//! Authentication service: signup, login and session lookups

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{is_unique_violation, AppError, AppResult},
    models::{
        library::LibraryWithBooks,
        user::{LoginRequest, SessionClaims, SignupRequest, User},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user and mint a session token for them.
    ///
    /// Username and email availability are checked in one combined lookup;
    /// when both are taken the username conflict wins. A duplicate insert
    /// that slips past the pre-check (concurrent signup) is converted from
    /// the unique-constraint violation to the same conflict error.
    pub async fn signup(&self, request: SignupRequest) -> AppResult<(String, User)> {
        request.validate()?;

        let (username_taken, email_taken) = self
            .repository
            .users
            .find_taken(&request.username, &request.email)
            .await?;

        if username_taken {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        if email_taken {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;

        let user = match self
            .repository
            .users
            .create(&request.username, &request.email, &password_hash)
            .await
        {
            Ok(user) => user,
            Err(AppError::Database(err)) if is_unique_violation(&err) => {
                return Err(AppError::Conflict(
                    "Username or email already registered".to_string(),
                ));
            }
            Err(err) => return Err(err),
        };

        tracing::info!("New user registered: {} (id={})", user.username, user.id);

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }

    /// Authenticate by username and password and mint a session token.
    /// Unknown usernames and wrong passwords share a 401 status but carry
    /// distinct messages.
    pub async fn login(&self, request: LoginRequest) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Authentication("No such user".to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            return Err(AppError::Authentication("Incorrect password".to_string()));
        }

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }

    /// Load the session user together with their libraries (books and
    /// ratings included), for client-side state rehydration.
    pub async fn session(&self, user_id: i32) -> AppResult<(User, Vec<LibraryWithBooks>)> {
        let user = self.repository.users.get_by_id(user_id).await?;

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

        Ok((user, hydrated))
    }

    /// Create a signed session token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.session_expiration_hours as i64 * 3600);

        let claims = SessionClaims {
            sub: user.username.clone(),
            user_id: user.id,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.session_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))
    }

    /// Verify a user's password against the stored argon2 hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
