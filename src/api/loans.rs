//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, LoanDetails, LoanQuery, UpdateLoan},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser, ListResponse, ValidatedJson, ValidatedQuery};

/// List loans, newest first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Matching loans", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<LoanQuery>,
) -> AppResult<Json<ListResponse<LoanDetails>>> {
    let loans = state.services.loans.search(&query).await?;
    Ok(ListResponse::counted("Loans retrieved", loans))
}

/// Search loans with filters sent as a JSON body
#[utoipa::path(
    post,
    path = "/loans/search",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = LoanQuery,
    responses(
        (status = 200, description = "Matching loans", body = Vec<LoanDetails>)
    )
)]
pub async fn search_loans(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(query): ValidatedJson<LoanQuery>,
) -> AppResult<Json<ListResponse<LoanDetails>>> {
    let loans = state.services.loans.search(&query).await?;
    Ok(ListResponse::counted("Loans retrieved", loans))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<LoanDetails>>> {
    let loan = state.services.loans.get_by_id(id).await?;
    Ok(ApiResponse::ok("Loan retrieved", loan))
}

/// Create a new loan (borrow toolkit units)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Toolkit not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Insufficient stock", body = crate::error::ErrorResponse),
        (status = 422, description = "Toolkit is not lendable", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(loan): ValidatedJson<CreateLoan>,
) -> AppResult<(StatusCode, Json<ApiResponse<LoanDetails>>)> {
    let created = state.services.loans.create(loan).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok("Loan created", created)))
}

/// Update a loan (partial); status and quantity changes move toolkit stock
#[utoipa::path(
    put,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = UpdateLoan,
    responses(
        (status = 200, description = "Loan updated", body = LoanDetails),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Insufficient stock", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(loan): ValidatedJson<UpdateLoan>,
) -> AppResult<Json<ApiResponse<LoanDetails>>> {
    let updated = state.services.loans.update(id, loan).await?;
    Ok(ApiResponse::ok("Loan updated", updated))
}

/// Delete a loan (soft delete); units still out go back to the toolkit
#[utoipa::path(
    delete,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan deleted"),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.loans.delete(id).await?;
    Ok(ApiResponse::ok("Loan deleted", ()))
}
