//! Credential extraction from inbound requests.
//!
//! # Purpose
//! Pull a candidate bearer token out of a token review request, and a
//! username/password pair out of an HTTP Basic `Authorization` header.
//!
//! # Key invariants
//! - The request body is tried first; the `Authorization` header is only
//!   consulted when the body does not parse or carries no token.
//! - A body that fails to parse is not an error on its own. Only the failure
//!   of both paths is reported.
//! - The header must start with the exact literal `"Bearer "`.
use crate::api::types::TokenReviewRequest;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

pub const BEARER_SCHEME: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Body,
    Header,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedToken {
    pub token: String,
    pub source: TokenSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no bearer token in request body or Authorization header")]
    MissingCredentials,
    #[error("Authorization requires 'Bearer' scheme")]
    InvalidScheme,
}

/// Username/password pair from an HTTP Basic header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Extract the token to review from a request body or its headers.
///
/// # Overview
/// Runs the two-phase lookup once: a `TokenReview` body with a non-empty
/// `spec.token` wins; otherwise an `Authorization: Bearer <token>` header is
/// required.
///
/// # Errors
/// - [`ExtractError::MissingCredentials`] when neither path yields a token.
/// - [`ExtractError::InvalidScheme`] when the header is present but does not
///   use the `Bearer ` scheme.
pub fn extract_token(body: &[u8], headers: &HeaderMap) -> Result<ExtractedToken, ExtractError> {
    if let Some(token) = token_from_body(body) {
        tracing::debug!("using token from review request body");
        return Ok(ExtractedToken {
            token,
            source: TokenSource::Body,
        });
    }
    tracing::debug!("no token in request body, trying Authorization header");
    let token = bearer_from_headers(headers)?;
    Ok(ExtractedToken {
        token: token.to_string(),
        source: TokenSource::Header,
    })
}

fn token_from_body(body: &[u8]) -> Option<String> {
    let request: TokenReviewRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "request body is not a token review");
            return None;
        }
    };
    request
        .spec
        .and_then(|spec| spec.token)
        .filter(|token| !token.is_empty())
}

fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, ExtractError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(ExtractError::MissingCredentials)?;
    let value = value.to_str().map_err(|_| ExtractError::InvalidScheme)?;
    if value.is_empty() {
        return Err(ExtractError::MissingCredentials);
    }
    value
        .strip_prefix(BEARER_SCHEME)
        .ok_or(ExtractError::InvalidScheme)
}

/// Parse `Authorization: Basic <base64(user:pass)>`.
///
/// The scheme name is matched case-insensitively and the decoded value is
/// split at the first `:`. Returns `None` for anything else.
pub fn basic_credentials(headers: &HeaderMap) -> Option<BasicCredentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}
