//! Authentication middleware: Bearer token extraction, token verification
//! and role guards.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use learnhub_core::auth::jwt::{bearer_token, verify_token};
use learnhub_core::auth::roles::RoleSet;
use learnhub_core::models::auth::TokenClaims;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Verified caller, stored in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: TokenClaims,
    pub roles: RoleSet,
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies the token,
/// resolves the caller's roles and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let token = bearer_token(header)
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization scheme".into()))?;

    let claims = verify_token(token, &state.config.jwt_secret)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))?;

    let roles = state.gate.resolve_roles(claims.user_id).await;
    debug!(user_id = claims.user_id, roles = roles.len(), "authenticated request");

    request
        .extensions_mut()
        .insert(AuthenticatedUser { claims, roles });

    Ok(next.run(request).await)
}

/// Axum middleware: rejects callers without the `admin` role.
///
/// Must run inside [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("Missing authentication".into()))?;

    if !user.roles.is_admin() {
        debug!(user_id = user.claims.user_id, "admin access denied");
        return Err(AppError::Forbidden("Admin access required".into()));
    }

    Ok(next.run(request).await)
}
