use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

pub mod organizations;
pub mod projects;
pub mod reports;
pub mod time_sheets;
pub mod users;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

/// Answers only when the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> AppResult<Response> {
    state.store.ping().await?;
    let payload = HealthPayload {
        status: "ok",
        service: "volunteer-api",
    };
    Ok(success(payload, "Health check successful"))
}
