//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the service: health and webhook routes behind the
//! request-id, trace, timeout, and panic layers.

pub mod health;
pub mod webhooks;

use std::any::Any;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

pub use health::{health_router, HealthResponse, HealthState};
pub use webhooks::{webhook_router, WebhookAppState};

use webhooks::WebhookErrorResponse;

/// Builds the full application router.
///
/// A request that outlives `request_timeout` is answered by `TimeoutLayer`
/// with 408 and an empty body, not the JSON error envelope. Paystack treats
/// that as a failed delivery and retries, but the event is not dead-lettered.
/// Config validation keeps the timeout above the pool acquire timeout so a
/// storage stall surfaces as a dead-lettered failure first.
pub fn app_router(
    webhooks: WebhookAppState,
    health: HealthState,
    request_timeout: Duration,
) -> Router {
    Router::new()
        .merge(health_router().with_state(health))
        .merge(webhook_router().with_state(webhooks))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, outcome = "failed", "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(WebhookErrorResponse::processing_failed()),
    )
        .into_response()
}
