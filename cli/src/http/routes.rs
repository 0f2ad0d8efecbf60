//! HTTP路由handlers

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use triage_core::api::{Admission, MetricsSnapshot};

use crate::http::{
    models::*,
    payload::{parse_webhook, WebhookEvent},
    signature::{verify_signature, SIGNATURE_HEADER},
    state::AppState,
};

const EVENT_HEADER: &str = "x-github-event";
const DELIVERY_HEADER: &str = "x-github-delivery";

/// 创建所有路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/github", post(github_webhook_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// POST /webhook/github - 校验签名、映射事件、同步准入后立即返回
async fn github_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpServerError> {
    if let Some(secret) = state.webhook_secret.as_deref() {
        if !verify_signature(secret, &body, header(&headers, SIGNATURE_HEADER)) {
            tracing::warn!(
                stage = "webhook.signature",
                "rejected delivery with invalid signature"
            );
            return Err(HttpServerError::InvalidSignature);
        }
    }

    let event = header(&headers, EVENT_HEADER)
        .ok_or_else(|| HttpServerError::InvalidRequest("missing X-GitHub-Event header".into()))?;
    let delivery = header(&headers, DELIVERY_HEADER).unwrap_or("-");

    let parsed = parse_webhook(event, &body).map_err(|e| {
        tracing::warn!(
            stage = "webhook.payload",
            event = %event,
            delivery = %delivery,
            error = %e
        );
        HttpServerError::InvalidRequest(e.to_string())
    })?;

    match parsed {
        WebhookEvent::Ping => {
            tracing::info!(stage = "webhook.ping", delivery = %delivery);
            Ok(Json(serde_json::json!({ "ok": true, "pong": true })).into_response())
        }
        WebhookEvent::Ignored(reason) => {
            tracing::debug!(
                stage = "webhook.ignored",
                event = %event,
                delivery = %delivery,
                reason
            );
            Ok(Json(WebhookResponse::ignored(reason)).into_response())
        }
        WebhookEvent::Event(inbound) => {
            tracing::debug!(
                stage = "webhook.event",
                kind = inbound.kind(),
                repository = %inbound.repository(),
                issue = inbound.issue().number,
                delivery = %delivery
            );
            // The background task is detached; the handle is not awaited.
            match state.engine.submit(inbound) {
                Admission::Accepted { event_id, key, .. } => Ok((
                    StatusCode::ACCEPTED,
                    Json(WebhookResponse::accepted(event_id.to_string(), key.to_string())),
                )
                    .into_response()),
                Admission::Skipped(reason) => {
                    Ok(Json(WebhookResponse::skipped(reason.as_str())).into_response())
                }
            }
        }
    }
}

/// GET /health - 健康检查
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.engine.snapshot().uptime_seconds,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// GET /metrics - 计数器快照
async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.engine.snapshot())
}
