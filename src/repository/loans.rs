//! Loans repository for database operations

use chrono::Utc;
use sqlx::{FromRow, PgConnection, Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{LoanStatus, Role, ToolkitStatus},
        loan::{CreateLoan, Loan, LoanDetails, LoanQuery},
        toolkit::ToolkitShort,
        user::UserShort,
    },
};

use super::{like_pattern, push_search};

const SELECT_DETAILS: &str = r#"
    SELECT l.*,
           u.username AS user_username, u.full_name AS user_full_name, u.role AS user_role,
           t.name AS toolkit_name, t.sku AS toolkit_sku,
           t.available AS toolkit_available, t.status AS toolkit_status
    FROM loans l
    LEFT JOIN users u ON u.id = l.user_id
    LEFT JOIN toolkits t ON t.id = l.toolkit_id
"#;

/// Loan joined with its borrower and toolkit columns
#[derive(FromRow)]
struct LoanRow {
    #[sqlx(flatten)]
    loan: Loan,
    user_username: Option<String>,
    user_full_name: Option<String>,
    user_role: Option<Role>,
    toolkit_name: Option<String>,
    toolkit_sku: Option<String>,
    toolkit_available: Option<i32>,
    toolkit_status: Option<ToolkitStatus>,
}

impl From<LoanRow> for LoanDetails {
    fn from(row: LoanRow) -> Self {
        let user = match (row.user_username, row.user_full_name, row.user_role) {
            (Some(username), Some(full_name), Some(role)) => Some(UserShort {
                id: row.loan.user_id,
                username,
                full_name,
                role,
            }),
            _ => None,
        };
        let toolkit = match (row.toolkit_name, row.toolkit_sku, row.toolkit_available, row.toolkit_status) {
            (Some(name), Some(sku), Some(available), Some(status)) => Some(ToolkitShort {
                id: row.loan.toolkit_id,
                name,
                sku,
                available,
                status,
            }),
            _ => None,
        };
        let is_overdue = row.loan.is_overdue(Utc::now());

        LoanDetails {
            loan: row.loan,
            user,
            toolkit,
            is_overdue,
        }
    }
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID with borrower and toolkit
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_DETAILS);
        builder
            .push(" WHERE l.id = ")
            .push_bind(id)
            .push(" AND l.deleted_at IS NULL");

        builder
            .build_query_as::<LoanRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(LoanDetails::from)
            .ok_or_else(|| not_found(id))
    }

    /// Fetch a loan and hold its row lock until the transaction ends
    pub async fn lock(&self, conn: &mut PgConnection, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 AND deleted_at IS NULL FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// List loans matching the filters, newest first
    pub async fn search(&self, query: &LoanQuery) -> AppResult<Vec<LoanDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_DETAILS);
        push_filters(&mut builder, query);
        builder.push(" ORDER BY l.created_at DESC, l.id DESC");

        let rows = builder
            .build_query_as::<LoanRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(LoanDetails::from).collect())
    }

    /// Insert a new loan in the `borrowed` state, borrowed now
    pub async fn create(&self, conn: &mut PgConnection, loan: &CreateLoan) -> AppResult<Loan> {
        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (
                user_id, toolkit_id, quantity, purpose, borrow_date, due_date,
                status, approved_by, notes, condition_checked
            )
            VALUES ($1, $2, $3, $4, NOW(), $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(loan.user_id)
        .bind(loan.toolkit_id)
        .bind(loan.quantity)
        .bind(&loan.purpose)
        .bind(loan.due_date)
        .bind(LoanStatus::Borrowed)
        .bind(&loan.approved_by)
        .bind(&loan.notes)
        .bind(&loan.condition_checked)
        .fetch_one(conn)
        .await?;

        Ok(created)
    }

    /// Write back every mutable column of a locked loan
    pub async fn save(&self, conn: &mut PgConnection, loan: &Loan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET
                user_id = $2, toolkit_id = $3, quantity = $4, purpose = $5,
                borrow_date = $6, due_date = $7, return_date = $8, status = $9,
                approved_by = $10, notes = $11, condition_checked = $12,
                condition_return = $13, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(loan.toolkit_id)
        .bind(loan.quantity)
        .bind(&loan.purpose)
        .bind(loan.borrow_date)
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(loan.status)
        .bind(&loan.approved_by)
        .bind(&loan.notes)
        .bind(&loan.condition_checked)
        .bind(&loan.condition_return)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| not_found(loan.id))
    }

    /// Soft delete a loan
    pub async fn delete(&self, conn: &mut PgConnection, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE loans SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Loan with id {} not found", id))
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &LoanQuery) {
    builder.push(" WHERE l.deleted_at IS NULL");

    if let Some(user_id) = query.user_id {
        builder.push(" AND l.user_id = ").push_bind(user_id);
    }
    if let Some(toolkit_id) = query.toolkit_id {
        builder.push(" AND l.toolkit_id = ").push_bind(toolkit_id);
    }
    if let Some(status) = query.status {
        builder.push(" AND l.status = ").push_bind(status);
    }
    if let Some(from) = query.date_from {
        builder.push(" AND l.borrow_date >= ").push_bind(from);
    }
    if let Some(to) = query.date_to {
        builder.push(" AND l.borrow_date <= ").push_bind(to);
    }
    match query.overdue {
        Some(true) => {
            builder.push(" AND l.due_date < NOW() AND l.status <> 'returned'");
        }
        Some(false) => {
            builder.push(" AND (l.due_date >= NOW() OR l.status = 'returned')");
        }
        None => {}
    }
    if let Some(pattern) = like_pattern(query.search_term.as_deref()) {
        push_search(builder, &["u.username", "u.full_name", "t.name", "l.purpose"], &pattern);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::loan::tests::loan;

    #[test]
    fn overdue_filter_excludes_returned_loans() {
        let query = LoanQuery {
            user_id: Some(4),
            overdue: Some(true),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM loans l");
        push_filters(&mut builder, &query);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM loans l WHERE l.deleted_at IS NULL AND l.user_id = $1 \
             AND l.due_date < NOW() AND l.status <> 'returned'"
        );
    }

    #[test]
    fn search_spans_borrower_and_toolkit() {
        let query = LoanQuery {
            search_term: Some("drill".to_string()),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM loans l");
        push_filters(&mut builder, &query);
        assert!(builder.sql().ends_with(
            "(u.username ILIKE $1 OR u.full_name ILIKE $2 OR t.name ILIKE $3 OR l.purpose ILIKE $4)"
        ));
    }

    #[test]
    fn row_without_joined_user_has_no_user_view() {
        let row = LoanRow {
            loan: loan(2, LoanStatus::Borrowed),
            user_username: None,
            user_full_name: None,
            user_role: None,
            toolkit_name: Some("Cordless drill".to_string()),
            toolkit_sku: Some("DRL-001".to_string()),
            toolkit_available: Some(8),
            toolkit_status: Some(ToolkitStatus::Available),
        };
        let details = LoanDetails::from(row);
        assert!(details.user.is_none());
        assert_eq!(details.toolkit.map(|t| t.available), Some(8));
        assert!(!details.is_overdue);
    }
}
