use std::sync::Arc;

use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};

use crate::main_lib::AppState;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    time_utc_iso: DateTime<Utc>,
}

/// Liveness probe.
async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time_utc_iso: Utc::now(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/health", get(get_health))
}
