//! Authentication service: password hashing, login and token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims},
    repository::Repository,
};

/// Issued session token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password, returning a token and the user
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(IssuedToken, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&user.password, password)? {
            tracing::warn!(username = %username, "Failed login attempt");
            return Err(invalid_credentials());
        }

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let issued = self.issue_token(&user)?;
        self.repository.users.touch_last_login(user.id).await?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok((issued, user))
    }

    /// Current user for a verified token
    pub async fn me(&self, claims: &UserClaims) -> AppResult<User> {
        self.repository.users.get_by_id(claims.user_id).await
    }

    /// Create a signed token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours as i64);

        let claims = UserClaims {
            sub: user.id.to_string(),
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            iss: self.config.jwt_issuer.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a bearer token against the configured secret and issuer
    pub fn verify_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret, &self.config.jwt_issuer)
            .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))
    }
}

fn invalid_credentials() -> AppError {
    AppError::Authentication("Invalid username or password".to_string())
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
