//! User management endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, User, UserQuery},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser, ListResponse, ValidatedJson, ValidatedQuery};

/// List users with filters and pagination
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "Page of users", body = Vec<User>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> AppResult<Json<ListResponse<User>>> {
    claims.require_admin()?;

    let page = state.services.users.search(&query).await?;
    Ok(ListResponse::paginated("Users retrieved", page.data, page.pagination))
}

/// Search users with filters sent as a JSON body
#[utoipa::path(
    post,
    path = "/users/search",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UserQuery,
    responses(
        (status = 200, description = "Page of users", body = Vec<User>),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(query): ValidatedJson<UserQuery>,
) -> AppResult<Json<ListResponse<User>>> {
    claims.require_admin()?;

    let page = state.services.users.search(&query).await?;
    Ok(ListResponse::paginated("Users retrieved", page.data, page.pagination))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<User>>> {
    claims.require_admin()?;

    let user = state.services.users.get_by_id(id).await?;
    Ok(ApiResponse::ok("User retrieved", user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(user): ValidatedJson<CreateUser>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    claims.require_admin()?;

    let created = state.services.users.create(user).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("User created", created)))
}

/// Update a user (partial)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(user): ValidatedJson<UpdateUser>,
) -> AppResult<Json<ApiResponse<User>>> {
    claims.require_admin()?;

    let updated = state.services.users.update(id, user).await?;
    Ok(ApiResponse::ok("User updated", updated))
}

/// Delete a user (soft delete)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 422, description = "User still has loans out", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    claims.require_admin()?;

    state.services.users.delete(id, claims.user_id).await?;
    Ok(ApiResponse::ok("User deleted", ()))
}
