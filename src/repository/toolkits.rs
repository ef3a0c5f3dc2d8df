//! Toolkits repository for database operations

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{ToolkitCondition, ToolkitStatus},
        pagination::PageRequest,
        toolkit::{CreateToolkit, Toolkit, ToolkitQuery},
    },
};

use super::{like_pattern, push_search};

const SELECT_WITH_CATEGORY: &str = r#"
    SELECT t.*, c.name AS category_name
    FROM toolkits t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

#[derive(Clone)]
pub struct ToolkitsRepository {
    pool: Pool<Postgres>,
}

impl ToolkitsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get toolkit by ID, with its category name
    pub async fn get_by_id(&self, id: i32) -> AppResult<Toolkit> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_WITH_CATEGORY);
        builder
            .push(" WHERE t.id = ")
            .push_bind(id)
            .push(" AND t.deleted_at IS NULL");

        builder
            .build_query_as::<Toolkit>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Fetch a toolkit and hold its row lock until the transaction ends
    pub async fn lock(&self, conn: &mut PgConnection, id: i32) -> AppResult<Toolkit> {
        sqlx::query_as::<_, Toolkit>(
            "SELECT * FROM toolkits WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Search toolkits with pagination
    pub async fn search(&self, query: &ToolkitQuery, page: &PageRequest) -> AppResult<(Vec<Toolkit>, i64)> {
        let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM toolkits t");
        push_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<Postgres>::new(SELECT_WITH_CATEGORY);
        push_filters(&mut builder, query);
        builder
            .push(" ORDER BY t.name, t.id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let toolkits = builder
            .build_query_as::<Toolkit>()
            .fetch_all(&self.pool)
            .await?;

        Ok((toolkits, total))
    }

    /// Create a new toolkit with every unit available
    pub async fn create(&self, toolkit: &CreateToolkit) -> AppResult<Toolkit> {
        let created = sqlx::query_as::<_, Toolkit>(
            r#"
            INSERT INTO toolkits (
                name, sku, description, category_id, quantity, available, unit,
                brand, model, serial_number, purchase_date, purchase_price,
                condition, status, image_url, notes
            )
            VALUES ($1, $2, $3, $4, $5, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(&toolkit.name)
        .bind(&toolkit.sku)
        .bind(&toolkit.description)
        .bind(toolkit.category_id)
        .bind(toolkit.quantity)
        .bind(toolkit.unit.as_deref().unwrap_or("unit"))
        .bind(&toolkit.brand)
        .bind(&toolkit.model)
        .bind(&toolkit.serial_number)
        .bind(toolkit.purchase_date)
        .bind(toolkit.purchase_price)
        .bind(toolkit.condition.unwrap_or(ToolkitCondition::Good))
        .bind(ToolkitStatus::Available)
        .bind(&toolkit.image_url)
        .bind(&toolkit.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Write back every mutable column of a locked toolkit
    pub async fn save(&self, conn: &mut PgConnection, toolkit: &Toolkit) -> AppResult<Toolkit> {
        sqlx::query_as::<_, Toolkit>(
            r#"
            UPDATE toolkits SET
                name = $2, sku = $3, description = $4, category_id = $5,
                quantity = $6, available = $7, unit = $8, brand = $9, model = $10,
                serial_number = $11, purchase_date = $12, purchase_price = $13,
                condition = $14, status = $15, image_url = $16, notes = $17,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(toolkit.id)
        .bind(&toolkit.name)
        .bind(&toolkit.sku)
        .bind(&toolkit.description)
        .bind(toolkit.category_id)
        .bind(toolkit.quantity)
        .bind(toolkit.available)
        .bind(&toolkit.unit)
        .bind(&toolkit.brand)
        .bind(&toolkit.model)
        .bind(&toolkit.serial_number)
        .bind(toolkit.purchase_date)
        .bind(toolkit.purchase_price)
        .bind(toolkit.condition)
        .bind(toolkit.status)
        .bind(&toolkit.image_url)
        .bind(&toolkit.notes)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| not_found(toolkit.id))
    }

    /// Count loans against a toolkit that are not returned yet
    pub async fn count_open_loans(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE toolkit_id = $1 AND status <> 'returned' AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Soft delete a toolkit
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE toolkits SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Toolkit with id {} not found", id))
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ToolkitQuery) {
    builder.push(" WHERE t.deleted_at IS NULL");

    if let Some(pattern) = like_pattern(query.search_term.as_deref()) {
        push_search(builder, &["t.name", "t.sku", "t.description"], &pattern);
    }
    if let Some(category_id) = query.category_id {
        builder.push(" AND t.category_id = ").push_bind(category_id);
    }
    if let Some(status) = query.status {
        builder.push(" AND t.status = ").push_bind(status);
    }
    if let Some(condition) = query.condition {
        builder.push(" AND t.condition = ").push_bind(condition);
    }
    if let Some(brand) = query.brand.as_deref().filter(|b| !b.is_empty()) {
        builder.push(" AND t.brand ILIKE ").push_bind(brand.to_string());
    }
    if let Some(min) = query.min_quantity {
        builder.push(" AND t.quantity >= ").push_bind(min);
    }
    if let Some(max) = query.max_quantity {
        builder.push(" AND t.quantity <= ").push_bind(max);
    }
}
