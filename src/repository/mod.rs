//! Repository layer for database operations

pub mod categories;
pub mod loans;
pub mod toolkits;
pub mod users;

use sqlx::{Pool, Postgres, QueryBuilder};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub categories: categories::CategoriesRepository,
    pub toolkits: toolkits::ToolkitsRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            toolkits: toolkits::ToolkitsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Trimmed, non-empty search term as an ILIKE pattern
pub(crate) fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", t))
}

/// Push `AND (col1 ILIKE $n OR col2 ILIKE $n ...)` for a search pattern
pub(crate) fn push_search(builder: &mut QueryBuilder<'_, Postgres>, columns: &[&str], pattern: &str) {
    builder.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*column).push(" ILIKE ").push_bind(pattern.to_string());
    }
    builder.push(")");
}
