//! Health API handler.
//!
//! # Purpose and responsibility
//! Lightweight liveness probe that also reports the running build version.
//!
//! # Key invariants and assumptions
//! - Health checks must be fast and side-effect free.
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthStatus)
    )
)]
/// Return the build version.
///
/// # Errors
/// - Does not return errors.
pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        build_version: state.build_version.clone(),
    })
}
