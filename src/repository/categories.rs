//! Categories repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CategoryQuery, CreateCategory, UpdateCategory, DEFAULT_COLOR},
};

use super::{like_pattern, push_search};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// List categories matching the filters, ordered by sort order then name
    pub async fn list(&self, query: &CategoryQuery) -> AppResult<Vec<Category>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM categories WHERE deleted_at IS NULL");

        if let Some(pattern) = like_pattern(query.search_term.as_deref()) {
            push_search(&mut builder, &["name", "description"], &pattern);
        }
        if let Some(parent_id) = query.parent_id {
            builder.push(" AND parent_id = ").push_bind(parent_id);
        }
        if let Some(is_active) = query.is_active {
            builder.push(" AND is_active = ").push_bind(is_active);
        }
        builder.push(" ORDER BY sort_order, name");

        let categories = builder
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    /// Create a new category
    pub async fn create(&self, category: &CreateCategory) -> AppResult<Category> {
        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, color, icon, parent_id, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.color.as_deref().unwrap_or(DEFAULT_COLOR))
        .bind(&category.icon)
        .bind(category.parent_id)
        .bind(category.sort_order.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update the fields present in `category`
    pub async fn update(&self, id: i32, category: &UpdateCategory) -> AppResult<Category> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE categories SET updated_at = NOW()");

        macro_rules! set_field {
            ($value:expr, $column:literal) => {
                if let Some(ref value) = $value {
                    builder.push(concat!(", ", $column, " = ")).push_bind(value.clone());
                }
            };
        }

        set_field!(category.name, "name");
        set_field!(category.description, "description");
        set_field!(category.color, "color");
        set_field!(category.icon, "icon");
        set_field!(category.parent_id, "parent_id");
        set_field!(category.sort_order, "sort_order");
        set_field!(category.is_active, "is_active");

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL RETURNING *");

        builder
            .build_query_as::<Category>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Count live toolkits and child categories still attached to a category
    pub async fn count_dependents(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM toolkits WHERE category_id = $1 AND deleted_at IS NULL)
                 + (SELECT COUNT(*) FROM categories WHERE parent_id = $1 AND deleted_at IS NULL)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Soft delete a category
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE categories SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category with id {} not found", id)));
        }
        Ok(())
    }
}
