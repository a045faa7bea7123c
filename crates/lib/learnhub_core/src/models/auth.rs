//! Authentication domain models.
//!
//! Claims and role assignments are fixed-field structs: a token payload with
//! unknown or missing fields fails to parse instead of being half-read.

use serde::{Deserialize, Serialize};

/// Domain user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// User with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: Option<String>,
}

/// Fields written when a user registers.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile: Option<String>,
    pub age: Option<i32>,
}

/// A named role from the role catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub role_name: String,
}

/// One row of the user ↔ role relation, joined with the role name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub subject_id: i64,
    pub role_id: i64,
    pub role_name: String,
}

/// Identity a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub subject_id: i64,
    pub email: String,
}

impl From<&User> for TokenSubject {
    fn from(user: &User) -> Self {
        Self {
            subject_id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Claims embedded in the payload segment of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenClaims {
    /// Subject: user ID.
    pub user_id: i64,
    /// User email.
    pub email: String,
    /// Expiry (unix timestamp). Always set on issued tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}
