//! In-memory [`AuthStore`] for tests and local development.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::AuthError;
use super::roles::{ADMIN_ROLE, STUDENT_ROLE};
use super::store::AuthStore;
use crate::models::auth::{NewUser, Role, RoleAssignment, User, UserWithPassword};

#[derive(Debug)]
struct State {
    users: Vec<UserWithPassword>,
    /// `(role_id, role_name)`.
    roles: Vec<(i64, String)>,
    /// `(user_id, role_id)`.
    assignments: Vec<(i64, i64)>,
    next_user_id: i64,
    unavailable: bool,
}

/// Mirrors the `users` / `roles` / `user_roles` tables, seeded with
/// `admin` (id 1) and `student` (id 2).
#[derive(Debug)]
pub struct MemoryAuthStore {
    state: RwLock<State>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                users: Vec::new(),
                roles: vec![(1, ADMIN_ROLE.into()), (2, STUDENT_ROLE.into())],
                assignments: Vec::new(),
                next_user_id: 1,
                unavailable: false,
            }),
        }
    }

    /// Add a named role, returning its ID. Existing names return the existing ID.
    pub async fn add_role(&self, role_name: &str) -> i64 {
        let mut state = self.state.write().await;
        if let Some((id, _)) = state.roles.iter().find(|(_, name)| name == role_name) {
            return *id;
        }
        let id = state.roles.iter().map(|(id, _)| *id).max().unwrap_or(0) + 1;
        state.roles.push((id, role_name.to_string()));
        id
    }

    /// Simulate a datastore outage: every call fails until reset.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    fn check_available(state: &State) -> Result<(), AuthError> {
        if state.unavailable {
            return Err(AuthError::Internal("datastore unavailable".into()));
        }
        Ok(())
    }
}

impl Default for MemoryAuthStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn fetch_role_assignments(
        &self,
        subject_id: i64,
    ) -> Result<Vec<RoleAssignment>, AuthError> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        let mut rows: Vec<RoleAssignment> = state
            .assignments
            .iter()
            .filter(|(user_id, _)| *user_id == subject_id)
            .filter_map(|(_, role_id)| {
                state
                    .roles
                    .iter()
                    .find(|(id, _)| id == role_id)
                    .map(|(id, name)| RoleAssignment {
                        subject_id,
                        role_id: *id,
                        role_name: name.clone(),
                    })
            })
            .collect();
        rows.sort_by_key(|r| r.role_id);
        Ok(rows)
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, AuthError> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.users.iter().find(|u| u.user.email == email).cloned())
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthError> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state
            .users
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.user.clone()))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
        let mut state = self.state.write().await;
        Self::check_available(&state)?;
        if state.users.iter().any(|u| u.user.email == user.email) {
            return Err(AuthError::Conflict("Email already exists".into()));
        }
        let created = User {
            id: state.next_user_id,
            name: user.name,
            email: user.email,
        };
        state.next_user_id += 1;
        state.users.push(UserWithPassword {
            user: created.clone(),
            password_hash: Some(user.password_hash),
        });
        Ok(created)
    }

    async fn grant_role(&self, user_id: i64, role_name: &str) -> Result<(), AuthError> {
        let mut state = self.state.write().await;
        Self::check_available(&state)?;
        let role_id = state
            .roles
            .iter()
            .find(|(_, name)| name == role_name)
            .map(|(id, _)| *id)
            .ok_or_else(|| AuthError::ValidationError(format!("Unknown role '{role_name}'")))?;
        if !state.assignments.contains(&(user_id, role_id)) {
            state.assignments.push((user_id, role_id));
        }
        Ok(())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, AuthError> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        let mut roles: Vec<Role> = state
            .roles
            .iter()
            .map(|(id, name)| Role {
                id: *id,
                role_name: name.clone(),
            })
            .collect();
        roles.sort_by_key(|r| r.id);
        Ok(roles)
    }

    async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<RoleAssignment, AuthError> {
        let mut state = self.state.write().await;
        Self::check_available(&state)?;
        let role_name = state
            .roles
            .iter()
            .find(|(id, _)| *id == role_id)
            .map(|(_, name)| name.clone());
        let user_exists = state.users.iter().any(|u| u.user.id == user_id);
        let Some(role_name) = role_name.filter(|_| user_exists) else {
            return Err(AuthError::ValidationError("Unknown user or role".into()));
        };
        if state.assignments.contains(&(user_id, role_id)) {
            return Err(AuthError::Conflict("Role already assigned".into()));
        }
        state.assignments.push((user_id, role_id));
        Ok(RoleAssignment {
            subject_id: user_id,
            role_id,
            role_name,
        })
    }

    async fn revoke_role(&self, user_id: i64, role_id: i64) -> Result<bool, AuthError> {
        let mut state = self.state.write().await;
        Self::check_available(&state)?;
        let before = state.assignments.len();
        state.assignments.retain(|a| *a != (user_id, role_id));
        Ok(state.assignments.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test".into(),
            email: email.into(),
            password_hash: "hash".into(),
            mobile: None,
            age: None,
        }
    }

    #[tokio::test]
    async fn create_and_find_user() {
        let store = MemoryAuthStore::new();
        let user = store.create_user(new_user("a@b.com")).await.unwrap();
        assert_eq!(user.id, 1);

        let found = store.find_user_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.user, user);
        assert_eq!(
            store.fetch_password_hash("a@b.com").await.unwrap().as_deref(),
            Some("hash")
        );
        assert_eq!(store.find_user_by_id(1).await.unwrap(), Some(user));
        assert!(store.fetch_password_hash("missing@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryAuthStore::new();
        store.create_user(new_user("a@b.com")).await.unwrap();
        assert!(matches!(
            store.create_user(new_user("a@b.com")).await,
            Err(AuthError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn grant_role_is_idempotent_and_checked() {
        let store = MemoryAuthStore::new();
        store.grant_role(5, ADMIN_ROLE).await.unwrap();
        store.grant_role(5, ADMIN_ROLE).await.unwrap();
        let rows = store.fetch_role_assignments(5).await.unwrap();
        assert_eq!(
            rows,
            vec![RoleAssignment {
                subject_id: 5,
                role_id: 1,
                role_name: ADMIN_ROLE.into()
            }]
        );
        assert!(matches!(
            store.grant_role(5, "wizard").await,
            Err(AuthError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn roles_are_listed_in_id_order() {
        let store = MemoryAuthStore::new();
        let tutor = store.add_role("tutor").await;
        let names: Vec<_> = store
            .list_roles()
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.id, r.role_name))
            .collect();
        assert_eq!(
            names,
            vec![
                (1, ADMIN_ROLE.to_string()),
                (2, STUDENT_ROLE.to_string()),
                (tutor, "tutor".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn assign_then_revoke_role() {
        let store = MemoryAuthStore::new();
        let user = store.create_user(new_user("a@b.com")).await.unwrap();

        let assigned = store.assign_role(user.id, 1).await.unwrap();
        assert_eq!(assigned.role_name, ADMIN_ROLE);
        assert!(matches!(
            store.assign_role(user.id, 1).await,
            Err(AuthError::Conflict(_))
        ));
        assert_eq!(store.fetch_role_assignments(user.id).await.unwrap(), vec![assigned]);

        assert!(store.revoke_role(user.id, 1).await.unwrap());
        assert!(!store.revoke_role(user.id, 1).await.unwrap());
        assert!(store.fetch_role_assignments(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn assign_role_checks_user_and_role() {
        let store = MemoryAuthStore::new();
        let user = store.create_user(new_user("a@b.com")).await.unwrap();
        assert!(matches!(
            store.assign_role(user.id, 99).await,
            Err(AuthError::ValidationError(_))
        ));
        assert!(matches!(
            store.assign_role(user.id + 1, 1).await,
            Err(AuthError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryAuthStore::new();
        store.set_unavailable(true).await;
        assert!(store.fetch_role_assignments(1).await.is_err());
        assert!(store.find_user_by_email("a@b.com").await.is_err());
        store.set_unavailable(false).await;
        assert!(store.fetch_role_assignments(1).await.unwrap().is_empty());
    }
}
