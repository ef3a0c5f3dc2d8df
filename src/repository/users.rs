//! Users repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{
        pagination::PageRequest,
        user::{CreateUser, UpdateUser, User, UserQuery},
    },
};

use super::{like_pattern, push_search};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1) AND deleted_at IS NULL",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Count every user row, deleted ones included
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery, page: &PageRequest) -> AppResult<(Vec<User>, i64)> {
        let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_filters(&mut builder, query);
        builder
            .push(" ORDER BY username LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total))
    }

    /// Create a new user with an already hashed password
    pub async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, full_name, password, role, department, phone_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(password_hash)
        .bind(user.role)
        .bind(&user.department)
        .bind(&user.phone_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update the fields present in `user`
    pub async fn update(&self, id: i32, user: &UpdateUser, password_hash: Option<String>) -> AppResult<User> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = NOW()");

        macro_rules! set_field {
            ($value:expr, $column:literal) => {
                if let Some(ref value) = $value {
                    builder.push(concat!(", ", $column, " = ")).push_bind(value.clone());
                }
            };
        }

        set_field!(user.username, "username");
        set_field!(user.email, "email");
        set_field!(user.full_name, "full_name");
        set_field!(password_hash, "password");
        set_field!(user.role, "role");
        set_field!(user.department, "department");
        set_field!(user.phone_number, "phone_number");
        set_field!(user.is_active, "is_active");

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL RETURNING *");

        builder
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Record a successful login
    pub async fn touch_last_login(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Count loans of a user that are not returned yet
    pub async fn count_open_loans(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND status <> 'returned' AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Soft delete a user
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), is_active = FALSE WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
    builder.push(" WHERE deleted_at IS NULL");

    if let Some(pattern) = like_pattern(query.search_term.as_deref()) {
        push_search(builder, &["username", "email", "full_name"], &pattern);
    }
    if let Some(role) = query.role {
        builder.push(" AND role = ").push_bind(role);
    }
    if let Some(department) = query.department.as_deref().filter(|d| !d.is_empty()) {
        builder.push(" AND department = ").push_bind(department.to_string());
    }
    if let Some(is_active) = query.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Role;

    #[test]
    fn filters_bind_every_present_field() {
        let query = UserQuery {
            search_term: Some("ali".to_string()),
            role: Some(Role::Technician),
            department: Some(String::new()),
            is_active: Some(true),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_filters(&mut builder, &query);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM users WHERE deleted_at IS NULL \
             AND (username ILIKE $1 OR email ILIKE $2 OR full_name ILIKE $3) \
             AND role = $4 AND is_active = $5"
        );
    }
}
