//! Request and response bodies.

use learnhub_core::auth::roles::RoleSet;
use learnhub_core::models::auth::{RoleAssignment, User};
use serde::{Deserialize, Serialize};

/// `POST /api/auth/register` body. Missing fields deserialize as blank and
/// are rejected by validation rather than by the JSON extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub mobile: Option<String>,
    pub age: Option<i32>,
}

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/users/roles/{assign,remove}` body. Accepts `userId`/`roleId`
/// as well as `user_id`/`role_id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeRequest {
    #[serde(alias = "user_id")]
    pub user_id: Option<i64>,
    #[serde(alias = "role_id")]
    pub role_id: Option<i64>,
}

/// Success envelope: `{ success, message, data }`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Error body: `{ error, message }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload {
    pub user: AuthUser,
    pub token: String,
}

/// `GET /api/auth/me` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub user_id: i64,
    pub email: String,
    pub exp: Option<i64>,
    pub roles: RoleSet,
}

/// `GET /api/admin/users/{id}/roles` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRolesResponse {
    pub user: AuthUser,
    pub roles: RoleSet,
}

/// `GET /api/health` payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// A single role assignment as returned by `POST /api/users/roles/assign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentResponse {
    pub user_id: i64,
    pub role_id: i64,
    pub role_name: String,
}

impl From<RoleAssignment> for RoleAssignmentResponse {
    fn from(a: RoleAssignment) -> Self {
        Self {
            user_id: a.subject_id,
            role_id: a.role_id,
            role_name: a.role_name,
        }
    }
}
