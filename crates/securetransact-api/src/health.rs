use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use securetransact_types::api::{DbTestResponse, HealthResponse};

use crate::error::ApiError;
use crate::{AppState, with_db};

/// GET /api/health: answers even in degraded mode.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".into(),
        message: "API server is running".into(),
        database: if state.database_ready() {
            "Connected"
        } else {
            "Disconnected"
        }
        .into(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/db-test: round-trips a query to the store.
pub async fn db_test(State(state): State<AppState>) -> Response {
    match with_db(&state, |db| db.ping()).await {
        Ok(time) => Json(DbTestResponse {
            status: "OK".into(),
            message: "Database connected".into(),
            time,
        })
        .into_response(),
        Err(ApiError::DatabaseUnavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "ERROR",
                "message": "Database unavailable",
                "suggestion": "Check that the database file is reachable and writable",
            })),
        )
            .into_response(),
        Err(e) => {
            warn!("Database test failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "ERROR",
                    "message": "Database connection error",
                    "error": e.to_string(),
                    "suggestion": "Check the database configuration",
                })),
            )
                .into_response()
        }
    }
}
