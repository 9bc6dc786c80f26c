use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
    timestamp: i64,
}

// GET /health - Liveness plus a round trip to the database
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let reachable = sqlx::query("SELECT 1").execute(&state.pool).await;

    let (status, database) = match reachable {
        Ok(_) => (StatusCode::OK, "up"),
        Err(e) => {
            tracing::error!("Health check could not reach database: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "down")
        }
    };

    let response = HealthResponse {
        status: if status == StatusCode::OK { "ok" } else { "degraded" },
        database,
        timestamp: chrono::Utc::now().timestamp(),
    };

    (status, Json(response))
}
