//! # learnhub_api
//!
//! HTTP API library for LearnHub: authentication endpoints and the bearer
//! and admin guards the rest of the platform's routes sit behind.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use learnhub_core::auth::roles::AuthorizationGate;
use learnhub_core::auth::store::AuthStore;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{admin, auth, health};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Users, roles and role assignments.
    pub store: Arc<dyn AuthStore>,
    /// Role resolution bounded by `config.role_lookup_timeout`.
    pub gate: AuthorizationGate,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn AuthStore>, config: ApiConfig) -> Self {
        let gate = AuthorizationGate::new(store.clone()).with_timeout(config.role_lookup_timeout);
        Self {
            store,
            gate,
            config,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `learnhub_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    learnhub_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler));

    // Admin routes (require auth + admin role)
    let admin = Router::new()
        .route(routes::GET_ADMIN_USER_ROLES, get(admin::user_roles_handler))
        .route(routes::POST_USERS_ROLES_ASSIGN, post(admin::assign_role_handler))
        .route(routes::POST_USERS_ROLES_REMOVE, post(admin::remove_role_handler))
        .layer(axum::middleware::from_fn(middleware::auth::require_admin));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_AUTH_ME, get(auth::me_handler))
        .route(routes::GET_ROLES, get(admin::list_roles_handler))
        .merge(admin)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
