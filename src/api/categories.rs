//! Category management endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::category::{Category, CategoryNode, CategoryQuery, CreateCategory, UpdateCategory},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser, ListResponse, ValidatedJson, ValidatedQuery};

/// List categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(CategoryQuery),
    responses(
        (status = 200, description = "Categories ordered by sort order and name", body = Vec<Category>),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<CategoryQuery>,
) -> AppResult<Json<ListResponse<Category>>> {
    claims.require_admin()?;

    let categories = state.services.categories.list(&query).await?;
    Ok(ListResponse::counted("Categories retrieved", categories))
}

/// Search categories with filters sent as a JSON body
#[utoipa::path(
    post,
    path = "/categories/search",
    tag = "categories",
    security(("bearer_auth" = [])),
    request_body = CategoryQuery,
    responses(
        (status = 200, description = "Matching categories", body = Vec<Category>)
    )
)]
pub async fn search_categories(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(query): ValidatedJson<CategoryQuery>,
) -> AppResult<Json<ListResponse<Category>>> {
    claims.require_admin()?;

    let categories = state.services.categories.list(&query).await?;
    Ok(ListResponse::counted("Categories retrieved", categories))
}

/// Root categories with their direct children
#[utoipa::path(
    get,
    path = "/categories/tree",
    tag = "categories",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Category tree", body = Vec<CategoryNode>)
    )
)]
pub async fn category_tree(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ListResponse<CategoryNode>>> {
    claims.require_admin()?;

    let tree = state.services.categories.tree().await?;
    Ok(ListResponse::counted("Category tree retrieved", tree))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = Category),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Category>>> {
    claims.require_admin()?;

    let category = state.services.categories.get_by_id(id).await?;
    Ok(ApiResponse::ok("Category retrieved", category))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Category name already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(category): ValidatedJson<CreateCategory>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    claims.require_admin()?;

    let created = state.services.categories.create(category).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("Category created", created)))
}

/// Update a category (partial)
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(category): ValidatedJson<UpdateCategory>,
) -> AppResult<Json<ApiResponse<Category>>> {
    claims.require_admin()?;

    let updated = state.services.categories.update(id, category).await?;
    Ok(ApiResponse::ok("Category updated", updated))
}

/// Delete a category (soft delete)
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Category still in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    claims.require_admin()?;

    state.services.categories.delete(id).await?;
    Ok(ApiResponse::ok("Category deleted", ()))
}
