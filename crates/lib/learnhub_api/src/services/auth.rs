//! Authentication service: register/login flows delegating to `learnhub_core::auth`.

use learnhub_core::auth::AuthError;
use learnhub_core::auth::jwt::issue_token;
use learnhub_core::auth::password::{hash_password, verify_password};
use learnhub_core::auth::roles::STUDENT_ROLE;
use learnhub_core::auth::store::AuthStore;
use learnhub_core::models::auth::{NewUser, TokenSubject, User};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{AuthPayload, LoginRequest, RegisterRequest};

/// Issue a token for `user` and build the response payload.
fn build_auth_payload(user: User, jwt_secret: &str, ttl_secs: i64) -> AppResult<AuthPayload> {
    let token = issue_token(&TokenSubject::from(&user), jwt_secret, ttl_secs)?;
    Ok(AuthPayload {
        user: user.into(),
        token,
    })
}

fn ensure_secret(jwt_secret: &str) -> AppResult<()> {
    if jwt_secret.is_empty() {
        return Err(AuthError::ConfigurationError("JWT secret is not configured".into()).into());
    }
    Ok(())
}

/// Register a new user account with the default `student` role.
pub async fn register(
    store: &dyn AuthStore,
    request: &RegisterRequest,
    jwt_secret: &str,
    ttl_secs: i64,
) -> AppResult<AuthPayload> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(AppError::Validation(
            "Name, email, and password are required".into(),
        ));
    }
    ensure_secret(jwt_secret)?;

    let password_hash = hash_password(&request.password)?;
    let user = store
        .create_user(NewUser {
            name: request.name.clone(),
            email: request.email.clone(),
            password_hash,
            mobile: request.mobile.clone(),
            age: request.age,
        })
        .await?;

    // The account exists either way; a missing default role only narrows access.
    if let Err(e) = store.grant_role(user.id, STUDENT_ROLE).await {
        warn!(user_id = user.id, error = %e, "failed to grant default role");
    }

    info!(user_id = user.id, "user registered");
    build_auth_payload(user, jwt_secret, ttl_secs)
}

/// Authenticate with email + password.
pub async fn login(
    store: &dyn AuthStore,
    request: &LoginRequest,
    jwt_secret: &str,
    ttl_secs: i64,
) -> AppResult<AuthPayload> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".into(),
        ));
    }
    ensure_secret(jwt_secret)?;

    let Some(password_hash) = store.fetch_password_hash(&request.email).await? else {
        return Err(AuthError::CredentialError.into());
    };
    if !verify_password(&request.password, &password_hash)? {
        return Err(AuthError::CredentialError.into());
    }
    let Some(found) = store.find_user_by_email(&request.email).await? else {
        return Err(AuthError::CredentialError.into());
    };

    build_auth_payload(found.user, jwt_secret, ttl_secs)
}

#[cfg(test)]
mod tests {
    use learnhub_core::auth::jwt::verify_token;
    use learnhub_core::auth::memory::MemoryAuthStore;
    use learnhub_core::auth::password::legacy_sha256_hex;
    use learnhub_core::auth::roles::resolve_roles;
    use learnhub_core::models::auth::{Role, RoleAssignment, UserWithPassword};

    use super::*;

    const SECRET: &str = "test-secret";
    const TTL: i64 = 3600;

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada".into(),
            email: email.into(),
            password: "pa55word".into(),
            mobile: Some("555-0100".into()),
            age: Some(36),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_issues_token_and_grants_student() {
        let store = MemoryAuthStore::new();
        let payload = register(&store, &register_request("ada@example.com"), SECRET, TTL)
            .await
            .unwrap();

        assert_eq!(payload.user.email, "ada@example.com");
        let claims = verify_token(&payload.token, SECRET).unwrap();
        assert_eq!(claims.user_id, payload.user.id);
        assert_eq!(claims.email, "ada@example.com");

        let roles = resolve_roles(&store, payload.user.id).await;
        assert!(roles.contains(STUDENT_ROLE));
        assert!(!roles.is_admin());
    }

    #[tokio::test]
    async fn register_stores_a_salted_hash() {
        let store = MemoryAuthStore::new();
        register(&store, &register_request("ada@example.com"), SECRET, TTL)
            .await
            .unwrap();
        let stored = store
            .fetch_password_hash("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored, "pa55word");
        assert!(verify_password("pa55word", &stored).unwrap());
    }

    #[tokio::test]
    async fn register_requires_fields() {
        let store = MemoryAuthStore::new();
        let mut request = register_request("ada@example.com");
        request.name = "  ".into();
        assert!(matches!(
            register(&store, &request, SECRET, TTL).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryAuthStore::new();
        register(&store, &register_request("ada@example.com"), SECRET, TTL)
            .await
            .unwrap();
        assert!(matches!(
            register(&store, &register_request("ada@example.com"), SECRET, TTL).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn missing_secret_fails_before_writing() {
        let store = MemoryAuthStore::new();
        assert!(matches!(
            register(&store, &register_request("ada@example.com"), "", TTL).await,
            Err(AppError::Internal(_))
        ));
        assert!(
            store
                .find_user_by_email("ada@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn login_round_trip() {
        let store = MemoryAuthStore::new();
        let registered = register(&store, &register_request("ada@example.com"), SECRET, TTL)
            .await
            .unwrap();

        let payload = login(&store, &login_request("ada@example.com", "pa55word"), SECRET, TTL)
            .await
            .unwrap();
        assert_eq!(payload.user, registered.user);
        assert!(verify_token(&payload.token, SECRET).is_some());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let store = MemoryAuthStore::new();
        register(&store, &register_request("ada@example.com"), SECRET, TTL)
            .await
            .unwrap();

        let wrong = login(&store, &login_request("ada@example.com", "nope"), SECRET, TTL)
            .await
            .unwrap_err();
        let unknown = login(&store, &login_request("who@example.com", "nope"), SECRET, TTL)
            .await
            .unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn login_accepts_legacy_hashes() {
        let store = MemoryAuthStore::new();
        store
            .create_user(NewUser {
                name: "Old".into(),
                email: "old@example.com".into(),
                password_hash: legacy_sha256_hex("legacy-pass"),
                mobile: None,
                age: None,
            })
            .await
            .unwrap();

        let payload = login(&store, &login_request("old@example.com", "legacy-pass"), SECRET, TTL)
            .await
            .unwrap();
        assert_eq!(payload.user.email, "old@example.com");
    }

    /// Delegates to a [`MemoryAuthStore`] but reports no stored password hash.
    struct NoHashStore(MemoryAuthStore);

    #[async_trait::async_trait]
    impl AuthStore for NoHashStore {
        async fn fetch_role_assignments(
            &self,
            subject_id: i64,
        ) -> Result<Vec<RoleAssignment>, AuthError> {
            self.0.fetch_role_assignments(subject_id).await
        }

        async fn find_user_by_email(
            &self,
            email: &str,
        ) -> Result<Option<UserWithPassword>, AuthError> {
            self.0.find_user_by_email(email).await
        }

        async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, AuthError> {
            self.0.find_user_by_id(user_id).await
        }

        async fn fetch_password_hash(&self, _email: &str) -> Result<Option<String>, AuthError> {
            Ok(None)
        }

        async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
            self.0.create_user(user).await
        }

        async fn grant_role(&self, user_id: i64, role_name: &str) -> Result<(), AuthError> {
            self.0.grant_role(user_id, role_name).await
        }

        async fn list_roles(&self) -> Result<Vec<Role>, AuthError> {
            self.0.list_roles().await
        }

        async fn assign_role(
            &self,
            user_id: i64,
            role_id: i64,
        ) -> Result<RoleAssignment, AuthError> {
            self.0.assign_role(user_id, role_id).await
        }

        async fn revoke_role(&self, user_id: i64, role_id: i64) -> Result<bool, AuthError> {
            self.0.revoke_role(user_id, role_id).await
        }
    }

    #[tokio::test]
    async fn login_checks_the_stored_password_hash() {
        let store = NoHashStore(MemoryAuthStore::new());
        register(&store, &register_request("ada@example.com"), SECRET, TTL)
            .await
            .unwrap();

        let err = login(&store, &login_request("ada@example.com", "pa55word"), SECRET, TTL)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn overlong_password_is_a_validation_error() {
        let store = MemoryAuthStore::new();
        let mut request = register_request("ada@example.com");
        request.password = "x".repeat(73);
        assert!(matches!(
            register(&store, &request, SECRET, TTL).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_requires_fields() {
        let store = MemoryAuthStore::new();
        assert!(matches!(
            login(&store, &login_request("", "x"), SECRET, TTL).await,
            Err(AppError::Validation(_))
        ));
    }
}
