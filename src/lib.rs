//! Toolkit Management Server
//!
//! REST JSON API for a shared toolkit inventory: users, categories,
//! toolkits and the loans that move toolkit stock in and out.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use api::create_router;
pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repositories and services over a connection pool
    pub fn new(config: AppConfig, pool: sqlx::PgPool) -> Self {
        let repository = repository::Repository::new(pool);
        let services = services::Services::new(repository, config.auth.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
