//! REST endpoint handlers for the oracle server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Liveness probe |
//! | `POST` | `/api/moderate` | Judge free text |
//! | `POST` | `/api/simulate/intervention` | Narrate a player intervention |
//! | `POST` | `/api/simulate/event` | Narrate a world event |
//! | `POST` | `/api/advisor` | Suggest next moves |

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use deeptime_types::{
    AdvisorRequest, AdvisorResponse, DENIAL_NARRATIVE, EventRequest, InterventionRequest,
    ModelMeta, ModerationRequest, ModerationVerdict, SimulationResponse,
};
use tracing::info;

use crate::advisor::advise;
use crate::error::OracleError;
use crate::narrator::{DEFAULT_COST_ESTIMATE, DEFAULT_EVENT_SUMMARY, Narration};
use crate::state::AppState;

/// Latency reported for requests refused by moderation.
const DENIAL_LATENCY_MS: u64 = 5;

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn narrated(narration: Narration, started: Instant) -> SimulationResponse {
    SimulationResponse {
        raw_text: narration.raw_text,
        parsed_update: Some(narration.update),
        parse_ok: true,
        model_meta: ModelMeta {
            model: narration.model,
            latency_ms: elapsed_ms(started),
        },
        moderation: None,
    }
}

/// `GET /api/health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/moderate`
pub async fn moderate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModerationRequest>,
) -> Json<ModerationVerdict> {
    Json(state.moderation.moderate(&request.text))
}

/// `POST /api/simulate/intervention`
///
/// Denied text gets HTTP 400 with the tribunal narrative and no update.
pub async fn simulate_intervention(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InterventionRequest>,
) -> Result<Response, OracleError> {
    let text = request.player_action.text.as_str();
    let verdict = state.moderation.moderate(text);
    if !verdict.allowed {
        let denial = SimulationResponse {
            raw_text: DENIAL_NARRATIVE.to_owned(),
            parsed_update: None,
            parse_ok: false,
            model_meta: ModelMeta {
                model: state.narrator.model().to_owned(),
                latency_ms: DENIAL_LATENCY_MS,
            },
            moderation: Some(verdict),
        };
        return Ok((StatusCode::BAD_REQUEST, Json(denial)).into_response());
    }

    let cost_estimate = request
        .economy
        .ob_cost_estimate
        .unwrap_or(DEFAULT_COST_ESTIMATE);
    let entropy_debt_before = request.economy.entropy_debt_before.unwrap_or(0.0);

    let started = Instant::now();
    let narration = state
        .narrator
        .narrate_intervention(text, cost_estimate, entropy_debt_before)?;
    info!(
        text,
        cost_estimate,
        entropy_debt_before,
        ob_cost_final = ?narration.update.ob_cost_final,
        model = %narration.model,
        "intervention narrated"
    );

    Ok(Json(narrated(narration, started)).into_response())
}

/// `POST /api/simulate/event`
pub async fn simulate_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EventRequest>,
) -> Result<Json<SimulationResponse>, OracleError> {
    let summary = request
        .event
        .summary
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_EVENT_SUMMARY);

    let started = Instant::now();
    let narration = state.narrator.narrate_event(summary)?;
    info!(summary, model = %narration.model, "event narrated");

    Ok(Json(narrated(narration, started)))
}

/// `POST /api/advisor`
///
/// Only `state.resources.entropy_debt` is read; a missing or partial state
/// counts as zero debt.
pub async fn advisor(Json(request): Json<AdvisorRequest>) -> Json<AdvisorResponse> {
    Json(advise(request.entropy_debt().unwrap_or(0.0)))
}
