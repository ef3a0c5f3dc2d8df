//! Toolkit catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::toolkit::{CreateToolkit, StockAdjustment, Toolkit, ToolkitQuery, UpdateToolkit},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser, ListResponse, ValidatedJson, ValidatedQuery};

/// List toolkits with filters and pagination
#[utoipa::path(
    get,
    path = "/toolkits",
    tag = "toolkits",
    security(("bearer_auth" = [])),
    params(ToolkitQuery),
    responses(
        (status = 200, description = "Page of toolkits", body = Vec<Toolkit>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_toolkits(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<ToolkitQuery>,
) -> AppResult<Json<ListResponse<Toolkit>>> {
    let page = state.services.toolkits.search(&query).await?;
    Ok(ListResponse::paginated("Toolkits retrieved", page.data, page.pagination))
}

/// Search toolkits with filters sent as a JSON body
#[utoipa::path(
    post,
    path = "/toolkits/search",
    tag = "toolkits",
    security(("bearer_auth" = [])),
    request_body = ToolkitQuery,
    responses(
        (status = 200, description = "Page of toolkits", body = Vec<Toolkit>)
    )
)]
pub async fn search_toolkits(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(query): ValidatedJson<ToolkitQuery>,
) -> AppResult<Json<ListResponse<Toolkit>>> {
    let page = state.services.toolkits.search(&query).await?;
    Ok(ListResponse::paginated("Toolkits retrieved", page.data, page.pagination))
}

/// Get toolkit by ID
#[utoipa::path(
    get,
    path = "/toolkits/{id}",
    tag = "toolkits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Toolkit ID")),
    responses(
        (status = 200, description = "Toolkit details", body = Toolkit),
        (status = 404, description = "Toolkit not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_toolkit(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Toolkit>>> {
    let toolkit = state.services.toolkits.get_by_id(id).await?;
    Ok(ApiResponse::ok("Toolkit retrieved", toolkit))
}

/// Create a toolkit; every unit starts available
#[utoipa::path(
    post,
    path = "/toolkits",
    tag = "toolkits",
    security(("bearer_auth" = [])),
    request_body = CreateToolkit,
    responses(
        (status = 201, description = "Toolkit created", body = Toolkit),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 409, description = "SKU already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_toolkit(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(toolkit): ValidatedJson<CreateToolkit>,
) -> AppResult<(StatusCode, Json<ApiResponse<Toolkit>>)> {
    claims.require_admin()?;

    let created = state.services.toolkits.create(toolkit).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("Toolkit created", created)))
}

/// Update a toolkit (partial)
#[utoipa::path(
    put,
    path = "/toolkits/{id}",
    tag = "toolkits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Toolkit ID")),
    request_body = UpdateToolkit,
    responses(
        (status = 200, description = "Toolkit updated", body = Toolkit),
        (status = 404, description = "Toolkit not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Quantity below units on loan, or SKU clash", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_toolkit(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(toolkit): ValidatedJson<UpdateToolkit>,
) -> AppResult<Json<ApiResponse<Toolkit>>> {
    claims.require_admin()?;

    let updated = state.services.toolkits.update(id, toolkit).await?;
    Ok(ApiResponse::ok("Toolkit updated", updated))
}

/// Adjust stock by a signed amount, clamped at zero
#[utoipa::path(
    patch,
    path = "/toolkits/{id}/stock",
    tag = "toolkits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Toolkit ID")),
    request_body = StockAdjustment,
    responses(
        (status = 200, description = "Stock adjusted", body = Toolkit),
        (status = 404, description = "Toolkit not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(adjustment): ValidatedJson<StockAdjustment>,
) -> AppResult<Json<ApiResponse<Toolkit>>> {
    claims.require_admin()?;

    let toolkit = state.services.toolkits.adjust_stock(id, adjustment).await?;
    Ok(ApiResponse::ok("Stock adjusted", toolkit))
}

/// Delete a toolkit (soft delete)
#[utoipa::path(
    delete,
    path = "/toolkits/{id}",
    tag = "toolkits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Toolkit ID")),
    responses(
        (status = 200, description = "Toolkit deleted"),
        (status = 404, description = "Toolkit not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Toolkit has loans out", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_toolkit(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    claims.require_admin()?;

    state.services.toolkits.delete(id).await?;
    Ok(ApiResponse::ok("Toolkit deleted", ()))
}
