//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::Role;
use crate::error::AppError;

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role: Role,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Short user representation embedded in loan listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&User> for UserShort {
    fn from(user: &User) -> Self {
        UserShort {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

/// User list filters (query string or JSON body)
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Case-insensitive match on username, email and full name
    pub search_term: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 64, message = "Username must be 3 to 64 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Role,
    pub department: Option<String>,
    pub phone_number: Option<String>,
}

/// Update user request. Absent fields are left unchanged; `department` and
/// `phone_number` may be sent as `null` to clear them.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 64, message = "Username must be 3 to 64 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub department: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub phone_number: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.full_name.is_none()
            && self.password.is_none()
            && self.role.is_none()
            && self.department.is_none()
            && self.phone_number.is_none()
            && self.is_active.is_none()
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub username: String,
    pub role: Role,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token (signature, expiry and issuer)
    pub fn from_token(token: &str, secret: &str, issuer: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let mut validation = Validation::default();
        validation.set_issuer(&[issuer]);
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_role(&[Role::Admin])
    }

    /// Require the token's role to be one of `allowed`
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient permissions".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";
    const ISSUER: &str = "toolkit-management";

    fn claims(role: Role, exp_offset: i64) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "alice".to_string(),
            user_id: 7,
            username: "alice".to_string(),
            role,
            iss: ISSUER.to_string(),
            exp: now + exp_offset,
            iat: now,
        }
    }

    #[test]
    fn token_round_trip_keeps_identity() {
        let token = claims(Role::Technician, 3600).create_token(SECRET).unwrap();
        let decoded = UserClaims::from_token(&token, SECRET, ISSUER).unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.role, Role::Technician);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = claims(Role::User, -3600).create_token(SECRET).unwrap();
        assert!(UserClaims::from_token(&token, SECRET, ISSUER).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = claims(Role::User, 3600).create_token(SECRET).unwrap();
        assert!(UserClaims::from_token(&token, "another-secret-that-is-long-enough!!", ISSUER).is_err());
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let token = claims(Role::User, 3600).create_token(SECRET).unwrap();
        assert!(UserClaims::from_token(&token, SECRET, "someone-else").is_err());
    }

    #[test]
    fn role_gates() {
        assert!(claims(Role::Admin, 60).require_admin().is_ok());
        assert!(matches!(
            claims(Role::User, 60).require_admin(),
            Err(AppError::Authorization(_))
        ));
        assert!(claims(Role::Technician, 60)
            .require_role(&[Role::Admin, Role::Technician])
            .is_ok());
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let absent: UpdateUser = serde_json::from_str(r#"{"full_name": "Bob"}"#).unwrap();
        assert_eq!(absent.department, None);

        let cleared: UpdateUser = serde_json::from_str(r#"{"department": null}"#).unwrap();
        assert_eq!(cleared.department, Some(None));

        let set: UpdateUser = serde_json::from_str(r#"{"department": "IT"}"#).unwrap();
        assert_eq!(set.department, Some(Some("IT".to_string())));
    }

    #[test]
    fn create_user_validation() {
        let user = CreateUser {
            username: "al".to_string(),
            email: "not-an-email".to_string(),
            full_name: "Al".to_string(),
            password: "123".to_string(),
            role: Role::User,
            department: None,
            phone_number: None,
        };
        let errors = user.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
