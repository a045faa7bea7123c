//! Datastore contract consumed by the auth core.

use async_trait::async_trait;

use super::AuthError;
use crate::models::auth::{NewUser, Role, RoleAssignment, User, UserWithPassword};

/// Users, the role catalogue and role assignments.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Role assignments for a subject, joined with role names.
    async fn fetch_role_assignments(
        &self,
        subject_id: i64,
    ) -> Result<Vec<RoleAssignment>, AuthError>;

    /// Look up a user and their stored password hash by email.
    async fn find_user_by_email(&self, email: &str)
    -> Result<Option<UserWithPassword>, AuthError>;

    /// Look up a user by ID.
    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthError>;

    /// Stored password hash for an email, `None` if the user is unknown or has no password.
    async fn fetch_password_hash(&self, email: &str) -> Result<Option<String>, AuthError> {
        Ok(self
            .find_user_by_email(email)
            .await?
            .and_then(|u| u.password_hash))
    }

    /// Insert a user. Fails with [`AuthError::Conflict`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError>;

    /// Assign a named role. Fails with [`AuthError::ValidationError`] for unknown roles.
    async fn grant_role(&self, user_id: i64, role_name: &str) -> Result<(), AuthError>;

    /// Every role in the catalogue, ordered by ID.
    async fn list_roles(&self) -> Result<Vec<Role>, AuthError>;

    /// Assign a role by ID.
    ///
    /// Fails with [`AuthError::Conflict`] if the user already holds it and
    /// [`AuthError::ValidationError`] if the user or role does not exist.
    async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<RoleAssignment, AuthError>;

    /// Remove a role assignment. Returns `false` if there was nothing to remove.
    async fn revoke_role(&self, user_id: i64, role_id: i64) -> Result<bool, AuthError>;
}
