use axum::Json;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    status: &'static str,
}

/// Liveness probe
///
/// Always 200 with a fixed body; the process answering is the whole check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
