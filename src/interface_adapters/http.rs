use crate::interface_adapters::protocol::{HealthResponse, StatsResponse};
use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// Live counters from whichever loop is running.
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from_snapshot(
        state.mode,
        state.counters.snapshot(),
    ))
}
