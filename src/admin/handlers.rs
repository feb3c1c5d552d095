use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admission::middleware::RouteStats;
use crate::admission::sweeper::sweep_guards;
use crate::entitlements::{Entitlement, EntitlementSummary};
use crate::http::AppState;

#[derive(Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub recipes: usize,
    pub entitlements: EntitlementSummary,
}

#[derive(Serialize, Deserialize)]
pub struct SweepResult {
    pub evicted: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntitlementUpdate {
    pub premium: Option<bool>,
    pub grant_free: Option<u32>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        recipes: state.catalog.list().len(),
        entitlements: state.entitlements.summary(),
    })
}

pub async fn get_admission(State(state): State<AppState>) -> Json<Vec<RouteStats>> {
    Json(state.guards.all().iter().map(|g| g.stats()).collect())
}

pub async fn sweep_admission(State(state): State<AppState>) -> Json<SweepResult> {
    let evicted = sweep_guards(&state.guards.all(), state.guards.retention_multiplier);
    tracing::info!(evicted, "Manual admission sweep");
    Json(SweepResult { evicted })
}

pub async fn get_entitlement(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Json<Entitlement> {
    Json(state.entitlements.get(&user))
}

pub async fn update_entitlement(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Json(update): Json<EntitlementUpdate>,
) -> Json<Entitlement> {
    if let Some(premium) = update.premium {
        state.entitlements.set_premium(&user, premium);
    }
    if let Some(count) = update.grant_free {
        state.entitlements.grant_free(&user, count);
    }
    tracing::info!(user = %user, ?update, "Entitlement updated");
    Json(state.entitlements.get(&user))
}
