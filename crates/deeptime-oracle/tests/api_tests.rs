//! Integration tests for the oracle API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use deeptime_core::mutate::apply_simulator_update;
use deeptime_core::parse::parse_simulator_update;
use deeptime_oracle::moderation::KeywordPolicy;
use deeptime_oracle::rate_limit::RateLimiter;
use deeptime_oracle::router::build_router;
use deeptime_oracle::state::AppState;
use deeptime_types::{GameState, SimulationResponse};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    build_router(Arc::new(AppState::default()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(router: Router, path: &str, body: &Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::post(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["status"], "ok");
}

#[tokio::test]
async fn test_moderate_allows_and_blocks() {
    let (status, body) = post_json(app(), "/api/moderate", &json!({"text": "Cool the oceans"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"allowed": true, "reason": "ok"}));

    let (status, body) = post_json(app(), "/api/moderate", &json!({"text": "spread HATE"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"allowed": false, "reason": "policy_blocked"}));
}

#[tokio::test]
async fn test_moderate_missing_text_is_allowed() {
    let (status, body) = post_json(app(), "/api/moderate", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);
}

#[tokio::test]
async fn test_intervention_denied_with_400() {
    let request = json!({
        "player_action": {"text": "Start an election riot"},
        "economy": {"ob_cost_estimate": 10, "entropy_debt_before": 0}
    });
    let (status, body) = post_json(app(), "/api/simulate/intervention", &request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["raw_text"],
        "The cosmic tribunal denies reality-bending in that direction."
    );
    assert_eq!(body["parse_ok"], false);
    assert!(body["parsed_update"].is_null());
    assert_eq!(body["model_meta"]["model"], "mock-sim");
    assert_eq!(body["model_meta"]["latency_ms"], 5);
    assert_eq!(body["moderation"]["reason"], "policy_blocked");
}

#[tokio::test]
async fn test_intervention_response_parses_with_core_parser() {
    let request = json!({
        "state": GameState::default(),
        "player_action": {
            "text": "Seed the ocean with nutrient blooms",
            "target": {"type": "region", "cells": [12]},
            "assumptions": {"scope_hint": "regional", "magnitude_hint": "medium"}
        },
        "economy": {"ob_cost_estimate": 22, "entropy_debt_before": 50}
    });
    let (status, body) = post_json(app(), "/api/simulate/intervention", &request).await;
    assert_eq!(status, StatusCode::OK);

    let response: SimulationResponse = serde_json::from_value(body).unwrap();
    assert!(response.parse_ok);
    assert_eq!(response.model_meta.model, "mock-sim");

    let structured = response.parsed_update.unwrap();
    assert_eq!(structured.ob_cost_final, Some(24.0));
    assert_eq!(structured.hidden_deltas["nutrient_flux"], json!(10.0));

    let outcome = parse_simulator_update(&response.raw_text);
    assert_eq!(outcome.parsed_update(), Some(&structured));

    let mut state = GameState::default();
    apply_simulator_update(&mut state, &structured, 22.0);
    assert_eq!(state.resources.ob_current, 76.0);
    assert_eq!(state.queue.len(), 1);
    assert_eq!(state.queue[0].trigger_time_years, 800_000.0);
}

#[tokio::test]
async fn test_intervention_defaults_economy() {
    let (status, body) = post_json(
        app(),
        "/api/simulate/intervention",
        &json!({"player_action": {"text": "stir"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parsed_update"]["ob_cost_final"], 22.0);
}

#[tokio::test]
async fn test_event_uses_default_summary() {
    let (status, body) = post_json(app(), "/api/simulate/event", &json!({"event": {}})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["raw_text"]
            .as_str()
            .unwrap()
            .starts_with("A major world event unfolds.\nThe biosphere adapts, badly.")
    );
    assert_eq!(body["model_meta"]["model"], "mock-event");
    assert_eq!(body["parsed_update"]["entropy_debt_delta"], 3.0);
    assert_eq!(body["parsed_update"]["global_deltas"]["biodiversity_index"], -4.0);
}

#[tokio::test]
async fn test_event_keeps_given_summary() {
    let (_, body) = post_json(
        app(),
        "/api/simulate/event",
        &json!({"event": {"summary": "Snowball Earth"}}),
    )
    .await;
    assert!(body["raw_text"].as_str().unwrap().starts_with("Snowball Earth\n"));
}

#[tokio::test]
async fn test_advisor_reads_entropy_debt() {
    let mut state = GameState::default();
    state.resources.entropy_debt = 80.0;
    let (status, body) = post_json(app(), "/api/advisor", &json!({"state": state})).await;
    assert_eq!(status, StatusCode::OK);

    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 5);
    assert_eq!(
        suggestions[3]["text"],
        "Open a controlled mantle plume and gamble on biodiversity reset."
    );
    assert_eq!(suggestions[3]["mode"], "chaos");

    let (_, body) = post_json(app(), "/api/advisor", &json!({})).await;
    assert_eq!(body["suggestions"][3]["text"], "Test a regional tectonic uplift.");
}

#[tokio::test]
async fn test_partial_state_is_accepted() {
    let partial = json!({"version": "0.9", "resources": {"entropy_debt": 75}});
    let (status, body) = post_json(app(), "/api/advisor", &json!({"state": partial})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["suggestions"][3]["text"]
            .as_str()
            .unwrap()
            .contains("mantle plume")
    );

    let (status, body) = post_json(
        app(),
        "/api/simulate/intervention",
        &json!({
            "state": {"global": {"mean_temp_c": 12}},
            "player_action": {"text": "cool the ocean"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parse_ok"], true);
}

#[tokio::test]
async fn test_rate_limit_returns_429_after_budget() {
    let router = app();
    for _ in 0..30 {
        let (status, _) = post_json(router.clone(), "/api/advisor", &json!({})).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = post_json(router.clone(), "/api/simulate/event", &json!({})).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Cosmic cooldown: your oracle is overheating.");
    assert_eq!(body["status"], 429);

    // Moderation is never limited.
    let (status, _) = post_json(router, "/api/moderate", &json!({"text": "hi"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_limiter_is_per_server_instance() {
    let tight = Arc::new(AppState::new(RateLimiter::new(1, Duration::from_secs(60))));
    let router = build_router(tight);
    let (status, _) = post_json(router.clone(), "/api/advisor", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(router, "/api/advisor", &json!({})).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // A fresh server starts with a fresh budget.
    let (status, _) = post_json(app(), "/api/advisor", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_custom_moderation_policy_is_used() {
    let state = AppState::default().with_moderation(Arc::new(KeywordPolicy::new(["comet"])));
    let router = build_router(Arc::new(state));
    let (status, body) = post_json(
        router,
        "/api/simulate/intervention",
        &json!({"player_action": {"text": "Summon a comet"}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["parse_ok"], false);
}
