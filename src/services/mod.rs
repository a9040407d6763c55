//! Business logic services

pub mod auth;
pub mod catalog;
pub mod libraries;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub libraries: libraries::LibrariesService,
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            libraries: libraries::LibrariesService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository),
        }
    }
}
