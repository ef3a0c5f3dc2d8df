//! Business logic services

pub mod auth;
pub mod categories;
pub mod loans;
pub mod seed;
pub mod stock;
pub mod toolkits;
pub mod users;

use crate::{config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub categories: categories::CategoriesService,
    pub toolkits: toolkits::ToolkitsService,
    pub loans: loans::LoansService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            users: users::UsersService::new(repository.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            toolkits: toolkits::ToolkitsService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            repository,
        }
    }

    /// Check that the database answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
