//! Liveness endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

#[derive(Debug, Clone)]
pub struct HealthState {
    pub service: String,
}

impl HealthState {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}

/// GET /health
pub async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
        service: state.service,
    })
}

pub fn health_router() -> Router<HealthState> {
    Router::new().route("/health", get(health))
}
