//! Response status table and API error helpers.
//!
//! # Purpose and responsibility
//! Maps every internal failure to exactly one HTTP status through closed
//! enumerations, and builds the `{"status": <code>, "error": <message>}` body
//! used by the login endpoint and unmatched routes.
//!
//! # Key invariants and assumptions
//! - [`ResponseStatus`] and [`FailureKind`] are matched exhaustively; adding a
//!   variant forces a status decision at compile time.
//! - Messages returned to callers are short and generic. Diagnostic detail is
//!   logged by the caller, never placed in the body.
use crate::api::types::ErrorResponse;
use crate::auth::credentials::CredentialError;
use crate::config::ConfigError;
use crate::auth::extract::ExtractError;
use crate::auth::token::TokenFailure;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Every status code the webhook can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    Created,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
}

impl ResponseStatus {
    pub fn code(self) -> StatusCode {
        match self {
            ResponseStatus::Ok => StatusCode::OK,
            ResponseStatus::Created => StatusCode::CREATED,
            ResponseStatus::BadRequest => StatusCode::BAD_REQUEST,
            ResponseStatus::Unauthorized => StatusCode::UNAUTHORIZED,
            ResponseStatus::Forbidden => StatusCode::FORBIDDEN,
            ResponseStatus::NotFound => StatusCode::NOT_FOUND,
            ResponseStatus::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Classified failure of a login or review request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MalformedRequest,
    InvalidScheme,
    SignatureInvalid,
    AlgorithmRejected,
    ClaimInvalid,
    CredentialInvalid,
    SigningFailed,
    ConfigMissing,
}

impl FailureKind {
    /// Status for this failure.
    ///
    /// Every token-review failure is a 400, including cryptographic ones;
    /// the control plane treats any non-200 review as unauthenticated.
    pub fn status(self) -> ResponseStatus {
        match self {
            FailureKind::MalformedRequest
            | FailureKind::InvalidScheme
            | FailureKind::SignatureInvalid
            | FailureKind::AlgorithmRejected
            | FailureKind::ClaimInvalid => ResponseStatus::BadRequest,
            FailureKind::CredentialInvalid | FailureKind::SigningFailed => {
                ResponseStatus::Unauthorized
            }
            FailureKind::ConfigMissing => ResponseStatus::InternalServerError,
        }
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::MalformedRequest => "malformed_request",
            FailureKind::InvalidScheme => "invalid_scheme",
            FailureKind::SignatureInvalid => "signature_invalid",
            FailureKind::AlgorithmRejected => "algorithm_rejected",
            FailureKind::ClaimInvalid => "claim_invalid",
            FailureKind::CredentialInvalid => "credential_invalid",
            FailureKind::SigningFailed => "signing_failed",
            FailureKind::ConfigMissing => "config_missing",
        }
    }
}

impl From<ExtractError> for FailureKind {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::MissingCredentials => FailureKind::MalformedRequest,
            ExtractError::InvalidScheme => FailureKind::InvalidScheme,
        }
    }
}

impl From<&TokenFailure> for FailureKind {
    fn from(failure: &TokenFailure) -> Self {
        match failure {
            TokenFailure::Malformed => FailureKind::MalformedRequest,
            TokenFailure::AlgorithmRejected(_) => FailureKind::AlgorithmRejected,
            TokenFailure::SignatureInvalid => FailureKind::SignatureInvalid,
            TokenFailure::Claim(_) => FailureKind::ClaimInvalid,
        }
    }
}

impl From<&CredentialError> for FailureKind {
    fn from(_: &CredentialError) -> Self {
        FailureKind::CredentialInvalid
    }
}

impl From<&ConfigError> for FailureKind {
    fn from(_: &ConfigError) -> Self {
        FailureKind::ConfigMissing
    }
}

/// Structured API error returned by handlers.
///
/// # Invariants
/// - `body.status` always equals the numeric value of `status`.
#[derive(Debug)]
pub struct ApiError {
    pub status: ResponseStatus,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: ResponseStatus, message: &str) -> Self {
        Self {
            status,
            body: ErrorResponse {
                status: status.code().as_u16(),
                error: message.to_string(),
            },
        }
    }

    pub fn from_failure(kind: FailureKind, message: &str) -> Self {
        Self::new(kind.status(), message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status.code(), Json(self.body)).into_response()
    }
}

pub fn api_not_found(message: &str) -> ApiError {
    ApiError::new(ResponseStatus::NotFound, message)
}

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    api_not_found("not found")
}
