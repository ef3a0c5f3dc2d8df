//! Authentication endpoints

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::AppResult, models::user::User, AppState};

use super::{ApiResponse, AuthenticatedUser, ValidatedJson};

/// Login request
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Signed JWT to send as `Authorization: Bearer <token>`
    pub token: String,
    /// Always "Bearer"
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let (issued, user) = state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?;

    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
            user,
        },
    ))
}

/// Get the currently authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.services.auth.me(&claims).await?;
    Ok(ApiResponse::ok("Current user", user))
}
