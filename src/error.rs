//! Error types for the toolkit server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Postgres SQLSTATE codes we translate into domain errors
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),
}

impl AppError {
    /// Stable machine-readable identifier for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "unauthorized",
            AppError::Authorization(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InsufficientStock(_) => "insufficient_stock",
            AppError::Database(_) => "database_error",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::BusinessRule(_) => "business_rule",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientStock(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            let constraint = db.constraint().unwrap_or_default();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return AppError::Conflict(conflict_message(constraint)),
                Some(FOREIGN_KEY_VIOLATION) => {
                    return AppError::Validation(format!("Referenced record does not exist ({})", constraint))
                }
                Some(CHECK_VIOLATION) => {
                    return AppError::BusinessRule(format!("Constraint {} violated", constraint))
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

/// Human message for a unique index clash, keyed by index name
fn conflict_message(constraint: &str) -> String {
    match constraint {
        "users_username_active_idx" => "Username already exists".to_string(),
        "users_email_active_idx" => "Email already exists".to_string(),
        "toolkits_sku_active_idx" => "Toolkit SKU already exists".to_string(),
        "toolkits_name_active_idx" => "Toolkit name already exists".to_string(),
        "categories_name_active_idx" => "Category name already exists".to_string(),
        other => format!("Duplicate value ({})", other),
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error kind (e.g. "not_found", "insufficient_stock")
    pub code: String,
    /// Human readable message
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::InsufficientStock(msg)
            | AppError::Conflict(msg)
            | AppError::BusinessRule(msg) => msg.clone(),
        };

        let body = Json(ErrorResponse {
            success: false,
            code: self.code().to_string(),
            error: message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
