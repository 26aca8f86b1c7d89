//! Axum router construction for the oracle API.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled for the
//! browser client and HTTP tracing on every request.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::rate_limit::enforce_rate_limit;
use crate::state::AppState;

/// Build the complete Axum router for the oracle server.
///
/// The router includes:
/// - `GET /api/health` -- liveness probe
/// - `POST /api/moderate` -- moderation verdict
/// - `POST /api/simulate/intervention` -- intervention narration (rate limited)
/// - `POST /api/simulate/event` -- event narration (rate limited)
/// - `POST /api/advisor` -- suggestions (rate limited)
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let limited = Router::new()
        .route(
            "/api/simulate/intervention",
            post(handlers::simulate_intervention),
        )
        .route("/api/simulate/event", post(handlers::simulate_event))
        .route("/api/advisor", post(handlers::advisor))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            enforce_rate_limit,
        ));

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/moderate", post(handlers::moderate))
        .merge(limited)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
