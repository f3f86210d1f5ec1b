use std::sync::Arc;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

pub mod health;
pub mod spot;

/// The full API router.
///
/// The API is read-only and consumed by a browser ledger that may be
/// served from a different dev origin, so CORS is open for GET.
pub fn app_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .merge(spot::router())
        .merge(health::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
