//! Role administration handlers. Everything except the role catalogue
//! sits behind `require_admin`.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use learnhub_core::models::auth::Role;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiResponse, RoleAssignmentResponse, RoleChangeRequest, UserRolesResponse};

/// `GET /api/admin/users/{id}/roles`: resolved roles for any user.
pub async fn user_roles_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<ApiResponse<UserRolesResponse>>> {
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let roles = state.gate.resolve_roles(user_id).await;
    Ok(Json(ApiResponse::ok(
        "Success",
        UserRolesResponse {
            user: user.into(),
            roles,
        },
    )))
}

fn role_change_ids(body: &RoleChangeRequest) -> AppResult<(i64, i64)> {
    match (body.user_id, body.role_id) {
        (Some(user_id), Some(role_id)) => Ok((user_id, role_id)),
        _ => Err(AppError::Validation("userId and roleId are required".into())),
    }
}

/// `POST /api/users/roles/assign`: grant a role to a user.
pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(body): Json<RoleChangeRequest>,
) -> AppResult<Json<ApiResponse<RoleAssignmentResponse>>> {
    let (user_id, role_id) = role_change_ids(&body)?;
    let assignment = state.store.assign_role(user_id, role_id).await?;
    info!(
        admin_id = caller.claims.user_id,
        user_id,
        role = %assignment.role_name,
        "role assigned"
    );
    Ok(Json(ApiResponse::ok("Role assigned", assignment.into())))
}

/// `POST /api/users/roles/remove`: revoke a role from a user.
pub async fn remove_role_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(body): Json<RoleChangeRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let (user_id, role_id) = role_change_ids(&body)?;
    if !state.store.revoke_role(user_id, role_id).await? {
        return Err(AppError::NotFound("Role assignment not found".into()));
    }
    info!(
        admin_id = caller.claims.user_id,
        user_id, role_id, "role removed"
    );
    Ok(Json(ApiResponse::ok("Role removed", ())))
}

/// `GET /api/roles`: the role catalogue. Any authenticated caller.
pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Role>>>> {
    let roles = state.store.list_roles().await?;
    Ok(Json(ApiResponse::ok("Success", roles)))
}
