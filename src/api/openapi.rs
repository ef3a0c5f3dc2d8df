//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, categories, health, loans, toolkits, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Toolkit Management API",
        version = "1.0.0",
        description = "Inventory and loan tracking for shared toolkits"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::search_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Categories
        categories::list_categories,
        categories::search_categories,
        categories::category_tree,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Toolkits
        toolkits::list_toolkits,
        toolkits::search_toolkits,
        toolkits::get_toolkit,
        toolkits::create_toolkit,
        toolkits::update_toolkit,
        toolkits::adjust_stock,
        toolkits::delete_toolkit,
        // Loans
        loans::list_loans,
        loans::search_loans,
        loans::get_loan,
        loans::create_loan,
        loans::update_loan,
        loans::delete_loan,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::UserQuery,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::enums::Role,
            // Categories
            crate::models::category::Category,
            crate::models::category::CategoryNode,
            crate::models::category::CategoryQuery,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            // Toolkits
            crate::models::toolkit::Toolkit,
            crate::models::toolkit::ToolkitShort,
            crate::models::toolkit::ToolkitQuery,
            crate::models::toolkit::CreateToolkit,
            crate::models::toolkit::UpdateToolkit,
            crate::models::toolkit::StockAdjustment,
            crate::models::enums::ToolkitStatus,
            crate::models::enums::ToolkitCondition,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanQuery,
            crate::models::loan::CreateLoan,
            crate::models::loan::UpdateLoan,
            crate::models::enums::LoanStatus,
            // Pagination
            crate::models::pagination::Pagination,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "categories", description = "Toolkit categories"),
        (name = "toolkits", description = "Toolkit catalog and stock"),
        (name = "loans", description = "Loan management")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in ["/auth/login", "/toolkits/{id}/stock", "/categories/tree", "/loans/{id}"] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {}", expected);
        }
        assert!(doc
            .components
            .as_ref()
            .map(|c| c.security_schemes.contains_key("bearer_auth"))
            .unwrap_or(false));
    }
}
