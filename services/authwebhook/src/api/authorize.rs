//! SubjectAccessReview endpoint handler.
//!
//! The body is passed through uninterpreted to the configured
//! [`AuthorizationPolicy`](crate::auth::policy::AuthorizationPolicy); the
//! answer is always 200 with the decision in `status`.
use crate::api::types::SubjectAccessReview;
use crate::app::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;

#[utoipa::path(
    post,
    path = "/v0/authorize",
    tag = "auth",
    responses(
        (status = 200, description = "Authorization decision", body = SubjectAccessReview)
    )
)]
pub async fn authorize(State(state): State<AppState>, body: Bytes) -> Json<SubjectAccessReview> {
    tracing::debug!(bytes = body.len(), "subject access review received");
    let decision = state.authorization_policy.decide(&body);
    metrics::counter!("authwebhook_authorize_total", "decision" => decision.label()).increment(1);
    Json(SubjectAccessReview::from(decision))
}
