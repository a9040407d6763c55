//! Bookrack Personal Library Cataloging Service
//!
//! A REST JSON API for managing per-user book libraries: users sign up,
//! create named (optionally private) libraries, attach books from a shared
//! catalog and rate them per library pairing.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
