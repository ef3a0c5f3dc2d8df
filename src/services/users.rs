//! User management service

use crate::{
    error::{AppError, AppResult},
    models::{
        pagination::{PageRequest, Paginated, Pagination},
        user::{CreateUser, UpdateUser, User, UserQuery},
    },
    repository::Repository,
};

use super::auth::hash_password;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<Paginated<User>> {
        let page = PageRequest::new(query.page, query.page_size);
        let (users, total) = self.repository.users.search(query, &page).await?;
        Ok(Paginated {
            data: users,
            pagination: Pagination::new(page, total),
        })
    }

    /// Create a new user
    pub async fn create(&self, user: CreateUser) -> AppResult<User> {
        let hash = hash_password(&user.password)?;
        let created = self.repository.users.create(&user, &hash).await?;
        tracing::info!(user_id = created.id, username = %created.username, role = %created.role, "User created");
        Ok(created)
    }

    /// Update a user; only fields present in the request change
    pub async fn update(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        if user.is_empty() {
            return self.repository.users.get_by_id(id).await;
        }

        let hash = match user.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };

        self.repository.users.update(id, &user, hash).await
    }

    /// Soft delete a user. Users with loans still out cannot be removed.
    pub async fn delete(&self, id: i32, acting_user_id: i32) -> AppResult<()> {
        if id == acting_user_id {
            return Err(AppError::BusinessRule("You cannot delete your own account".to_string()));
        }

        self.repository.users.get_by_id(id).await?;
        let open = self.repository.users.count_open_loans(id).await?;
        if open > 0 {
            return Err(AppError::BusinessRule(format!(
                "User still has {} loans that are not returned",
                open
            )));
        }

        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
