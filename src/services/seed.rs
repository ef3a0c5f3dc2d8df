//! First-run seeding of the administrator account

use crate::{
    config::SeedConfig,
    error::AppResult,
    models::{enums::Role, user::CreateUser},
    repository::Repository,
};

use super::auth::hash_password;

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

/// Create the administrator when the users table is empty and a password
/// is configured. Returns whether an account was created.
pub async fn seed_admin(repository: &Repository, config: &SeedConfig) -> AppResult<bool> {
    let Some(password) = config.admin_password.as_deref().filter(|p| !p.is_empty()) else {
        tracing::debug!("No admin password configured, skipping seed");
        return Ok(false);
    };

    if repository.users.count_all().await? > 0 {
        return Ok(false);
    }

    let admin = admin_request(config, password);
    let hash = hash_password(&admin.password)?;
    let created = repository.users.create(&admin, &hash).await?;

    tracing::info!(user_id = created.id, username = %created.username, "Seeded administrator account");
    Ok(true)
}

fn admin_request(config: &SeedConfig, password: &str) -> CreateUser {
    CreateUser {
        username: config
            .admin_username
            .clone()
            .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
        email: config
            .admin_email
            .clone()
            .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
        full_name: "Administrator".to_string(),
        password: password.to_string(),
        role: Role::Admin,
        department: None,
        phone_number: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_request_falls_back_to_defaults() {
        let request = admin_request(&SeedConfig::default(), "change-me-now");
        assert_eq!(request.username, "admin");
        assert_eq!(request.email, "admin@example.com");
        assert_eq!(request.role, Role::Admin);
    }

    #[test]
    fn admin_request_uses_configured_identity() {
        let config = SeedConfig {
            admin_username: Some("root".to_string()),
            admin_email: Some("root@tools.local".to_string()),
            admin_password: Some("x".to_string()),
        };
        let request = admin_request(&config, "x");
        assert_eq!(request.username, "root");
        assert_eq!(request.email, "root@tools.local");
    }
}
