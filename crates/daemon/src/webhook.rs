// SPDX-License-Identifier: MIT

//! Webhook HTTP server: `GET /health`, `POST /webhook`, routed
//! through the Event Bus (C4). Built with `axum`, the right shape for an
//! HTTP webhook boundary.

use crate::app::App;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use mf_core::SystemEvent;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Event types the webhook accepts. Kept as a fixed list rather than
/// accepting anything, so an unknown type gets a 400.
const KNOWN_EVENT_TYPES: &[&str] = &[
    "traffic_drop",
    "low_conversion",
    "campaign_launched",
    "competitor_alert",
    "budget_threshold_reached",
    "content_published",
];

struct WebhookCounters {
    received: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

pub struct WebhookState {
    app: Arc<App>,
    counters: WebhookCounters,
    started_at: Instant,
}

impl WebhookState {
    fn new(app: Arc<App>) -> Self {
        Self {
            app,
            counters: WebhookCounters {
                received: AtomicU64::new(0),
                accepted: AtomicU64::new(0),
                rejected: AtomicU64::new(0),
            },
            started_at: Instant::now(),
        }
    }
}

pub fn router(app: Arc<App>) -> Router {
    let state = Arc::new(WebhookState::new(app));
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(receive_webhook))
        .with_state(state)
}

/// Binds `config.webhook_bind` and serves until `cancel` fires.
pub async fn serve(app: Arc<App>, cancel: mf_core::CancelToken) -> std::io::Result<()> {
    let bind = app.config.webhook_bind;
    let router = router(app);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, router).with_graceful_shutdown(async move { cancel.cancelled().await }).await
}

async fn health(State(state): State<Arc<WebhookState>>) -> impl IntoResponse {
    let body = health_body(&state);
    (StatusCode::OK, Json(body))
}

fn health_body(state: &WebhookState) -> Value {
    json!({
        "status": "healthy",
        "uptime": state.started_at.elapsed().as_secs(),
        "webhooksReceived": state.counters.received.load(Ordering::SeqCst),
        "webhooksAccepted": state.counters.accepted.load(Ordering::SeqCst),
        "webhooksRejected": state.counters.rejected.load(Ordering::SeqCst),
    })
}

async fn receive_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> impl IntoResponse {
    state.counters.received.fetch_add(1, Ordering::SeqCst);

    if !authorized(&headers, state.app.config.webhook_token.as_deref()) {
        state.counters.rejected.fetch_add(1, Ordering::SeqCst);
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response();
    }

    let parsed: Result<Value, _> = serde_json::from_slice(&body);
    let Ok(value) = parsed else {
        state.counters.rejected.fetch_add(1, Ordering::SeqCst);
        return bad_request("malformed JSON body");
    };

    match validate_event(&value) {
        Ok(event) => {
            state.counters.accepted.fetch_add(1, Ordering::SeqCst);
            let result = state.app.event_bus.emit(&event).await;
            (
                StatusCode::OK,
                Json(json!({
                    "status": "accepted",
                    "eventId": result.event_id,
                    "pipelinesTriggered": result.pipelines_triggered,
                    "pipelineIds": result.pipeline_ids,
                    "skippedReasons": result.skipped_reasons,
                })),
            )
                .into_response()
        }
        Err(message) => {
            state.counters.rejected.fetch_add(1, Ordering::SeqCst);
            bad_request(&message)
        }
    }
}

fn bad_request(message: &str) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "Bad Request", "message": message }))).into_response()
}

fn authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else { return false };
    let Some(value) = headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    value.strip_prefix("Bearer ") == Some(expected)
}

/// Validates a `SystemEvent` shape.
fn validate_event(value: &Value) -> Result<SystemEvent, String> {
    let obj = value.as_object().ok_or_else(|| "body must be a JSON object".to_string())?;

    let id = obj.get("id").and_then(Value::as_str).filter(|s| !s.is_empty()).ok_or_else(|| "missing or empty id".to_string())?;
    let event_type = obj
        .get("type")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing or empty type".to_string())?;
    if !KNOWN_EVENT_TYPES.contains(&event_type) {
        return Err(format!("unknown event type: {event_type}"));
    }
    let timestamp_ms = obj.get("timestamp").and_then(Value::as_u64).ok_or_else(|| "missing timestamp".to_string())?;
    let source = obj.get("source").and_then(Value::as_str).ok_or_else(|| "missing source".to_string())?;
    let data = match obj.get("data") {
        None => HashMap::new(),
        Some(Value::Object(map)) => map.clone().into_iter().collect::<HashMap<String, Value>>(),
        Some(_) => return Err("data must be a non-null, non-array object".to_string()),
    };

    Ok(SystemEvent {
        id: id.to_string(),
        event_type: event_type.to_string(),
        timestamp_ms,
        source: source.to_string(),
        data,
    })
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
