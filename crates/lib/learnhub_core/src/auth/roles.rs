//! Role resolution and role-membership predicates.
//!
//! Role lookups never fail a request: no rows and a failed lookup both
//! resolve to an empty [`RoleSet`], which grants nothing. The two cases are
//! logged differently (`debug` vs `warn`).

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::AuthError;
use super::store::AuthStore;
use crate::models::auth::RoleAssignment;

pub const ADMIN_ROLE: &str = "admin";
pub const STUDENT_ROLE: &str = "student";

/// Default upper bound on a single role lookup.
pub const DEFAULT_ROLE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Role names held by a subject at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True iff `"admin"` is a member.
    pub fn is_admin(&self) -> bool {
        self.contains(ADMIN_ROLE)
    }

    /// True iff at least one of `required` is a member.
    pub fn has_any_role<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        required.into_iter().any(|role| self.contains(role.as_ref()))
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Resolve the role names assigned to `subject_id`.
pub async fn resolve_roles<S>(store: &S, subject_id: i64) -> RoleSet
where
    S: AuthStore + ?Sized,
{
    roles_from_lookup(subject_id, store.fetch_role_assignments(subject_id).await)
}

fn roles_from_lookup(subject_id: i64, lookup: Result<Vec<RoleAssignment>, AuthError>) -> RoleSet {
    match lookup {
        Ok(rows) if rows.is_empty() => {
            debug!(subject_id, "no roles assigned");
            RoleSet::new()
        }
        Ok(rows) => rows.into_iter().map(|row| row.role_name).collect(),
        Err(e) => {
            warn!(subject_id, error = %e, "role lookup failed; treating as no roles");
            RoleSet::new()
        }
    }
}

/// Resolves roles through a shared store with a bounded lookup time.
///
/// Lookups are not retried; a timeout counts as a failed lookup.
#[derive(Clone)]
pub struct AuthorizationGate {
    store: Arc<dyn AuthStore>,
    lookup_timeout: Duration,
}

impl AuthorizationGate {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self {
            store,
            lookup_timeout: DEFAULT_ROLE_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    pub async fn resolve_roles(&self, subject_id: i64) -> RoleSet {
        let lookup = self.store.fetch_role_assignments(subject_id);
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(result) => roles_from_lookup(subject_id, result),
            Err(_) => {
                warn!(
                    subject_id,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "role lookup timed out; treating as no roles"
                );
                RoleSet::new()
            }
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::auth::memory::MemoryAuthStore;
    use crate::models::auth::{NewUser, Role, User, UserWithPassword};

    /// Store whose role lookup never completes.
    struct StalledStore;

    #[async_trait]
    impl AuthStore for StalledStore {
        async fn fetch_role_assignments(
            &self,
            _subject_id: i64,
        ) -> Result<Vec<RoleAssignment>, AuthError> {
            std::future::pending().await
        }

        async fn find_user_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<UserWithPassword>, AuthError> {
            Ok(None)
        }

        async fn find_user_by_id(&self, _user_id: i64) -> Result<Option<User>, AuthError> {
            Ok(None)
        }

        async fn create_user(&self, _user: NewUser) -> Result<User, AuthError> {
            Err(AuthError::Internal("read-only".into()))
        }

        async fn grant_role(&self, _user_id: i64, _role_name: &str) -> Result<(), AuthError> {
            Err(AuthError::Internal("read-only".into()))
        }

        async fn list_roles(&self) -> Result<Vec<Role>, AuthError> {
            Ok(Vec::new())
        }

        async fn assign_role(
            &self,
            _user_id: i64,
            _role_id: i64,
        ) -> Result<RoleAssignment, AuthError> {
            Err(AuthError::Internal("read-only".into()))
        }

        async fn revoke_role(&self, _user_id: i64, _role_id: i64) -> Result<bool, AuthError> {
            Err(AuthError::Internal("read-only".into()))
        }
    }

    #[tokio::test]
    async fn admin_assignment_resolves_to_admin() {
        let store = MemoryAuthStore::new();
        store.grant_role(42, ADMIN_ROLE).await.unwrap();

        let roles = resolve_roles(&store, 42).await;
        assert_eq!(roles, RoleSet::from_iter(["admin"]));
        assert!(roles.is_admin());
        assert!(roles.has_any_role(["editor", "admin"]));
    }

    #[tokio::test]
    async fn no_assignments_resolve_to_empty_set() {
        let store = MemoryAuthStore::new();
        let roles = resolve_roles(&store, 7).await;
        assert!(roles.is_empty());
        assert!(!roles.is_admin());
    }

    #[tokio::test]
    async fn failed_lookup_resolves_to_empty_set() {
        let store = MemoryAuthStore::new();
        store.grant_role(1, ADMIN_ROLE).await.unwrap();
        store.set_unavailable(true).await;

        let roles = resolve_roles(&store, 1).await;
        assert!(roles.is_empty());
        assert!(!roles.is_admin());
    }

    #[tokio::test]
    async fn gate_resolves_multiple_roles() {
        let store = Arc::new(MemoryAuthStore::new());
        store.grant_role(3, STUDENT_ROLE).await.unwrap();
        store.grant_role(3, ADMIN_ROLE).await.unwrap();

        let gate = AuthorizationGate::new(store);
        let roles = gate.resolve_roles(3).await;
        assert_eq!(roles.len(), 2);
        assert_eq!(roles.iter().collect::<Vec<_>>(), vec!["admin", "student"]);
    }

    #[tokio::test]
    async fn gate_times_out_to_empty_set() {
        let gate = AuthorizationGate::new(Arc::new(StalledStore))
            .with_timeout(Duration::from_millis(20));
        assert_eq!(gate.lookup_timeout(), Duration::from_millis(20));
        let roles = gate.resolve_roles(1).await;
        assert!(roles.is_empty());
    }

    #[test]
    fn predicates_on_empty_set() {
        let roles = RoleSet::new();
        assert!(!roles.is_admin());
        assert!(!roles.has_any_role(["admin", "student"]));
        assert!(!roles.has_any_role(Vec::<String>::new()));
    }

    #[test]
    fn has_any_role_requires_intersection() {
        let roles = RoleSet::from_iter(["student"]);
        assert!(roles.has_any_role(["student"]));
        assert!(!roles.has_any_role(["editor", "admin"]));
        assert!(!roles.is_admin());
    }

    #[test]
    fn role_names_are_case_sensitive() {
        let roles = RoleSet::from_iter(["Admin"]);
        assert!(!roles.is_admin());
    }

    #[test]
    fn serializes_as_sorted_array() {
        let roles = RoleSet::from_iter(["student", "admin"]);
        assert_eq!(
            serde_json::to_string(&roles).unwrap(),
            r#"["admin","student"]"#
        );
    }
}
