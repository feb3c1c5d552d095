//! Admin API.
//!
//! Served on its own listener, behind a bearer key.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::AppState;

pub fn setup_admin_router(state: AppState, api_key: &str) -> Router {
    let api_key: Arc<str> = Arc::from(api_key);

    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/admission", get(get_admission))
        .route("/admin/admission/sweep", post(sweep_admission))
        .route(
            "/admin/entitlements/{user}",
            get(get_entitlement).put(update_entitlement),
        )
        .layer(middleware::from_fn_with_state(api_key, admin_auth_middleware))
        .with_state(state)
}
