//! API handlers for the toolkit REST endpoints

pub mod auth;
pub mod categories;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod toolkits;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use validator::{Validate, ValidationErrors};

use crate::{error::AppError, models::pagination::Pagination, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = state.services.auth.verify_token(token)?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body that has been deserialized and validated.
/// Both kinds of failure become a `Validation` error.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| AppError::Validation(validation_message(&errors)))?;
        Ok(ValidatedJson(value))
    }
}

/// Query string counterpart of [`ValidatedJson`]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| AppError::Validation(validation_message(&errors)))?;
        Ok(ValidatedQuery(value))
    }
}

/// One line per failing field, sorted by field name
fn validation_message(errors: &ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| match e.message {
                    Some(ref message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    lines.sort();
    lines.join("; ")
}

/// Success envelope for single values
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}

/// Success envelope for lists, with either `pagination` or `count`
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn paginated(message: impl Into<String>, data: Vec<T>, pagination: Pagination) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
            pagination: Some(pagination),
            count: None,
        })
    }

    pub fn counted(message: impl Into<String>, data: Vec<T>) -> Json<Self> {
        let count = data.len();
        Json(Self {
            success: true,
            message: message.into(),
            data,
            pagination: None,
            count: Some(count),
        })
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/search", post(users::search_users))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        // Categories
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route("/categories/search", post(categories::search_categories))
        .route("/categories/tree", get(categories::category_tree))
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Toolkits
        .route("/toolkits", get(toolkits::list_toolkits).post(toolkits::create_toolkit))
        .route("/toolkits/search", post(toolkits::search_toolkits))
        .route(
            "/toolkits/:id",
            get(toolkits::get_toolkit)
                .put(toolkits::update_toolkit)
                .delete(toolkits::delete_toolkit),
        )
        .route("/toolkits/:id/stock", patch(toolkits::adjust_stock))
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/loans/search", post(loans::search_loans))
        .route(
            "/loans/:id",
            get(loans::get_loan).put(loans::update_loan).delete(loans::delete_loan),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(range(min = 1))]
        quantity: i32,
    }

    #[test]
    fn validation_message_lists_each_field() {
        let sample = Sample {
            name: "ab".to_string(),
            quantity: 0,
        };
        let errors = sample.validate().unwrap_err();
        assert_eq!(validation_message(&errors), "name: too short; quantity: range");
    }

    #[test]
    fn list_envelope_omits_unused_metadata() {
        let Json(body) = ListResponse::counted("Loans retrieved", vec![1, 2, 3]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 3);
        assert!(json.get("pagination").is_none());
    }
}
