//! Login endpoint handler.
//!
//! # Purpose
//! Exchanges HTTP Basic credentials for a signed bearer token.
//!
//! # Security considerations
//! Every failure (missing header, unknown user, wrong password, signing error)
//! returns the same 401 body so the response does not reveal which check
//! failed. The distinction is only logged.
use crate::api::error::{ApiError, FailureKind, ResponseStatus};
use crate::api::types::LoginResponse;
use crate::app::AppState;
use crate::auth::extract::basic_credentials;
use crate::auth::token::issue_token;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

pub const LOGIN_FAILED: &str = "Authentication failed";

#[utoipa::path(
    post,
    path = "/v0/login",
    tag = "auth",
    responses(
        (status = 201, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Authentication failed", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let Some(credentials) = basic_credentials(&headers) else {
        tracing::warn!("login request without basic auth credentials");
        return Err(reject(FailureKind::CredentialInvalid, "missing_credentials"));
    };

    let identity = match state
        .credentials
        .validate(&credentials.username, &credentials.password)
        .await
    {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(username = %credentials.username, error = %err, "login rejected");
            return Err(reject(FailureKind::from(&err), "rejected"));
        }
    };

    let token = issue_token(&identity, &state.signing_secret).map_err(|err| {
        tracing::error!(error = %err, "failed to sign token");
        reject(FailureKind::SigningFailed, FailureKind::SigningFailed.as_str())
    })?;

    tracing::info!(username = %identity.username, expiry = token.expiry, "token issued");
    metrics::counter!("authwebhook_login_total", "outcome" => "issued").increment(1);
    Ok((
        ResponseStatus::Created.code(),
        Json(LoginResponse {
            token: token.token,
            expiry: token.expiry,
        }),
    ))
}

fn reject(kind: FailureKind, outcome: &'static str) -> ApiError {
    metrics::counter!("authwebhook_login_total", "outcome" => outcome).increment(1);
    ApiError::from_failure(kind, LOGIN_FAILED)
}
