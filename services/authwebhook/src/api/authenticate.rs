//! Token review endpoint handler.
//!
//! # Purpose
//! Answers the control plane's "who holds this token" question with a
//! `TokenReview` body.
//!
//! # Key invariants and assumptions
//! - 200 with `authenticated: true` only when extraction, signature, and claim
//!   checks all pass.
//! - Every failure answers 400 with `authenticated: false` and `user: null`.
use crate::api::error::{FailureKind, ResponseStatus};
use crate::api::types::TokenReview;
use crate::app::AppState;
use crate::auth::extract::extract_token;
use crate::auth::token::{AuthenticationResult, validate_token};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

#[utoipa::path(
    post,
    path = "/v0/authenticate",
    tag = "auth",
    request_body = crate::api::types::TokenReviewRequest,
    responses(
        (status = 200, description = "Token accepted", body = TokenReview),
        (status = 400, description = "Missing, malformed, or rejected token", body = TokenReview)
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let extracted = match extract_token(&body, &headers) {
        Ok(extracted) => extracted,
        Err(err) => {
            tracing::warn!(error = %err, "token review without usable credentials");
            return reject(FailureKind::from(err));
        }
    };

    match validate_token(&extracted.token, &state.signing_secret) {
        AuthenticationResult {
            authenticated: true,
            identity: Some(identity),
            ..
        } => {
            tracing::debug!(
                username = %identity.username,
                source = ?extracted.source,
                "token authenticated"
            );
            metrics::counter!("authwebhook_authenticate_total", "outcome" => "authenticated")
                .increment(1);
            review_response(ResponseStatus::Ok, TokenReview::authenticated(&identity))
        }
        AuthenticationResult { failure, .. } => {
            let kind = failure
                .as_ref()
                .map_or(FailureKind::MalformedRequest, FailureKind::from);
            match &failure {
                Some(reason) => tracing::warn!(reason = %reason, "token rejected"),
                None => tracing::warn!("token rejected without reason"),
            }
            reject(kind)
        }
    }
}

fn reject(kind: FailureKind) -> Response {
    metrics::counter!("authwebhook_authenticate_total", "outcome" => kind.as_str()).increment(1);
    review_response(kind.status(), TokenReview::unauthenticated())
}

fn review_response(status: ResponseStatus, review: TokenReview) -> Response {
    (status.code(), Json(review)).into_response()
}
