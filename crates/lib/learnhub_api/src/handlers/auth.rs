//! Authentication request handlers.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    ApiResponse, AuthPayload, CurrentUserResponse, LoginRequest, RegisterRequest,
};
use crate::services::auth;

/// `POST /api/auth/register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<AuthPayload>>> {
    let payload = auth::register(
        state.store.as_ref(),
        &body,
        &state.config.jwt_secret,
        state.config.token_ttl_secs,
    )
    .await?;
    Ok(Json(ApiResponse::ok("Registration successful", payload)))
}

/// `POST /api/auth/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthPayload>>> {
    let payload = auth::login(
        state.store.as_ref(),
        &body,
        &state.config.jwt_secret,
        state.config.token_ttl_secs,
    )
    .await?;
    Ok(Json(ApiResponse::ok("Login successful", payload)))
}

/// `GET /api/auth/me`: the verified caller and their roles.
pub async fn me_handler(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<CurrentUserResponse>> {
    let AuthenticatedUser { claims, roles } = user;
    Json(ApiResponse::ok(
        "Success",
        CurrentUserResponse {
            user_id: claims.user_id,
            email: claims.email,
            exp: claims.exp,
            roles,
        },
    ))
}
