//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::role::not_blank;

/// User account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub role_id: Option<i64>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        custom(function = "not_blank", message = "Username is required"),
        length(max = 50, message = "Username must be at most 50 characters")
    )]
    pub username: String,

    #[validate(length(min = 1, max = 128, message = "Password must be 1 to 128 characters"))]
    pub password: String,

    #[validate(email(message = "Email is not valid"), length(max = 255))]
    pub email: Option<String>,

    #[validate(length(max = 100, message = "Full name must be at most 100 characters"))]
    pub full_name: Option<String>,

    pub role_id: Option<i64>,
}

/// Update user request. Fields overwrite the stored values in place;
/// `password` is only changed when present.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        custom(function = "not_blank", message = "Username is required"),
        length(max = 50, message = "Username must be at most 50 characters")
    )]
    pub username: String,

    #[validate(length(min = 1, max = 128, message = "Password must be 1 to 128 characters"))]
    pub password: Option<String>,

    #[validate(email(message = "Email is not valid"), length(max = 255))]
    pub email: Option<String>,

    #[validate(length(max = 100, message = "Full name must be at most 100 characters"))]
    pub full_name: Option<String>,

    pub role_id: Option<i64>,

    /// 省略时保留当前状态
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Values handed to the repository after hashing
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub role_id: Option<i64>,
}

/// Replacement values for an existing user; `password_hash` of `None` keeps the old hash
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password_hash: Option<String>,
    pub role_id: Option<i64>,
    /// `None` keeps the stored flag
    pub enabled: Option<bool>,
}

/// User response (without sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role_id: Option<i64>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role_id: user.role_id,
            enabled: user.enabled,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
