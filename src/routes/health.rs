use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthData {
    status: u16,
    /// `false` when running on the in-memory store.
    persistent: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthData> {
    Json(HealthData {
        status: StatusCode::OK.as_u16(),
        persistent: state.persistent,
    })
}
