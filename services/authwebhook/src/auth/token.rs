//! Bearer token issuance and validation.
//!
//! # Purpose
//! Define the claim set carried by webhook-issued JWTs and the helpers that
//! sign them at login and verify them during token review.
//!
//! # Key invariants
//! - Tokens are signed with a shared HMAC secret (HS256 at issuance).
//! - Only the HMAC family (HS256/HS384/HS512) is accepted on verification;
//!   the algorithm is checked before any signature work is done.
//! - `exp == iat + 24h` at issuance and is never extended afterwards.
//! - A token is valid only if `uid` is non-empty, `exp` is set and not in the
//!   past, and `iat` is at most one second ahead of the verifier's clock.
//!
//! # Concurrency model
//! [`SigningSecret`] holds pre-built encoding/decoding keys and is immutable
//! after construction; share it behind an `Arc` across request handlers.
//!
//! # Security model
//! - Attackers may present arbitrary JWTs, including ones that name an
//!   asymmetric algorithm to trick the verifier into a public-key path.
//! - Tokens are stateless bearer credentials: there is no revocation, and a
//!   token stays valid until `exp`.
//!
//! # How to use
//! Call [`issue_token`] after a successful credential check and
//! [`validate_token`] with a token obtained from a review request. The `_at`
//! variants take an explicit clock value for deterministic callers.
use crate::auth::identity::Identity;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Lifetime of every issued token.
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Forward clock skew tolerated for the `iat` claim, in seconds.
pub const ISSUED_AT_SKEW_SECS: i64 = 1;

const ISSUE_ALGORITHM: Algorithm = Algorithm::HS256;
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Claims embedded in webhook-issued JWTs.
///
/// # Overview
/// Field names match the JSON payload on the wire (`iat`, `exp`, `username`,
/// `uid`, `groups`). Missing fields decode to empty values so that claim
/// validation, not deserialization, reports what is wrong.
///
/// # Examples
/// ```rust
/// use authwebhook::auth::token::Claims;
///
/// let claims = Claims {
///     iat: 1_700_000_000,
///     exp: 1_700_086_400,
///     username: "alice".to_string(),
///     uid: "alice".to_string(),
///     groups: vec!["dev".to_string()],
/// };
/// assert_eq!(claims.exp - claims.iat, 86_400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub groups: Vec<String>,
}

/// A signed token and its expiry (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token: String,
    pub expiry: i64,
}

/// Shared HMAC signing secret with its derived jsonwebtoken keys.
///
/// # Overview
/// Building the keys once avoids re-deriving them per request. The raw secret
/// is not retained and `Debug` output is redacted.
///
/// # Errors
/// - [`TokenError::EmptySecret`] when constructed from an empty string.
#[derive(Clone)]
pub struct SigningSecret {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningSecret {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Errors produced while issuing a token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Why a presented token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenFailure {
    #[error("malformed token")]
    Malformed,
    #[error("signing algorithm {0} is not accepted")]
    AlgorithmRejected(String),
    #[error("token signature does not match")]
    SignatureInvalid,
    #[error(transparent)]
    Claim(#[from] ClaimViolation),
}

/// Claim invariants checked after the signature is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimViolation {
    #[error("uid must be present in token claims")]
    MissingUid,
    #[error("token has no expiry")]
    MissingExpiry,
    #[error("token has expired")]
    Expired,
    #[error("token is issued in the future")]
    IssuedInFuture,
}

/// Outcome of a single token review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    pub authenticated: bool,
    pub identity: Option<Identity>,
    pub failure: Option<TokenFailure>,
}

impl AuthenticationResult {
    pub fn success(identity: Identity) -> Self {
        Self {
            authenticated: true,
            identity: Some(identity),
            failure: None,
        }
    }

    pub fn failure(reason: TokenFailure) -> Self {
        Self {
            authenticated: false,
            identity: None,
            failure: Some(reason),
        }
    }
}

/// Issue a token for `identity` using the current wall clock.
///
/// # Errors
/// - [`TokenError::Signing`] if the JWT cannot be encoded.
pub fn issue_token(identity: &Identity, secret: &SigningSecret) -> Result<Token, TokenError> {
    issue_token_at(identity, secret, now_epoch_seconds())
}

/// Issue a token as if the clock read `now` (unix seconds).
///
/// Deterministic: identical identity, secret, and `now` produce the same token.
pub fn issue_token_at(
    identity: &Identity,
    secret: &SigningSecret,
    now: i64,
) -> Result<Token, TokenError> {
    let identity = identity.clone().normalized();
    let expiry = now + TOKEN_TTL.as_secs() as i64;
    let claims = Claims {
        iat: now,
        exp: expiry,
        username: identity.username,
        uid: identity.uid,
        groups: identity.groups,
    };
    let token = jsonwebtoken::encode(&Header::new(ISSUE_ALGORITHM), &claims, &secret.encoding)?;
    Ok(Token { token, expiry })
}

/// Validate `token` against `secret` using the current wall clock.
pub fn validate_token(token: &str, secret: &SigningSecret) -> AuthenticationResult {
    validate_token_at(token, secret, now_epoch_seconds())
}

/// Validate `token` as if the clock read `now` (unix seconds).
///
/// # Overview
/// Each step short-circuits with its own [`TokenFailure`]:
/// 1. structural parse of the header,
/// 2. algorithm restricted to the HMAC family,
/// 3. signature recomputed with `secret`,
/// 4. claims decoded and checked with [`validate_claims`].
///
/// On success the identity is rebuilt from the claims.
pub fn validate_token_at(token: &str, secret: &SigningSecret, now: i64) -> AuthenticationResult {
    match verify(token, secret, now) {
        Ok(claims) => AuthenticationResult::success(Identity::new(
            claims.username,
            claims.uid,
            String::new(),
            claims.groups,
        )),
        Err(reason) => AuthenticationResult::failure(reason),
    }
}

// Only the `alg` member matters before the signature is checked.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Read `alg` from the JOSE header without trusting jsonwebtoken's closed
/// algorithm list, so `none` and unknown names are reported as rejected
/// algorithms rather than as parse errors.
fn header_algorithm(token: &str) -> Result<Algorithm, TokenFailure> {
    let mut segments = token.split('.');
    let (Some(header), Some(_), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenFailure::Malformed);
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenFailure::Malformed)?;
    let raw: RawHeader = serde_json::from_slice(&bytes).map_err(|_| TokenFailure::Malformed)?;
    match raw.alg.as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(TokenFailure::AlgorithmRejected(raw.alg)),
    }
}

fn verify(token: &str, secret: &SigningSecret, now: i64) -> Result<Claims, TokenFailure> {
    let alg = header_algorithm(token)?;

    // Time-based claims are checked by validate_claims, not by jsonwebtoken.
    let mut validation = Validation::new(alg);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;

    let data = jsonwebtoken::decode::<Claims>(token, &secret.decoding, &validation).map_err(
        |err| match err.kind() {
            ErrorKind::InvalidSignature => TokenFailure::SignatureInvalid,
            ErrorKind::InvalidAlgorithm => TokenFailure::AlgorithmRejected(format!("{alg:?}")),
            _ => TokenFailure::Malformed,
        },
    )?;
    validate_claims(&data.claims, now)?;
    Ok(data.claims)
}

/// Check the claim invariants of a signature-verified token.
///
/// # Errors
/// - [`ClaimViolation::MissingUid`] if `uid` is empty.
/// - [`ClaimViolation::MissingExpiry`] if `exp` is zero.
/// - [`ClaimViolation::Expired`] if `exp < now`.
/// - [`ClaimViolation::IssuedInFuture`] if `iat > now + 1`.
pub fn validate_claims(claims: &Claims, now: i64) -> Result<(), ClaimViolation> {
    if claims.uid.is_empty() {
        return Err(ClaimViolation::MissingUid);
    }
    if claims.exp == 0 {
        return Err(ClaimViolation::MissingExpiry);
    }
    if claims.exp < now {
        return Err(ClaimViolation::Expired);
    }
    if claims.iat > now + ISSUED_AT_SKEW_SECS {
        return Err(ClaimViolation::IssuedInFuture);
    }
    Ok(())
}

pub fn now_epoch_seconds() -> i64 {
    // A clock before the epoch clamps to zero instead of panicking.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}

// Tokens minted by older issuers may carry `"groups": null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn secret(value: &str) -> SigningSecret {
        SigningSecret::new(value).expect("secret")
    }

    fn alice() -> Identity {
        Identity::new("alice", "", "alice@example.com", vec!["dev".to_string()])
    }

    fn sign_raw(claims: &serde_json::Value, key: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .expect("encode")
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            SigningSecret::new(""),
            Err(TokenError::EmptySecret)
        ));
    }

    #[test]
    fn secret_debug_is_redacted() {
        assert_eq!(format!("{:?}", secret("s3cr3t")), "SigningSecret(<redacted>)");
    }

    #[test]
    fn issued_token_validates_with_defaulted_uid() {
        let key = secret("k1");
        let token = issue_token_at(&alice(), &key, NOW).expect("issue");
        assert_eq!(token.expiry, NOW + 86_400);

        let result = validate_token_at(&token.token, &key, NOW + 10);
        assert!(result.authenticated);
        assert_eq!(result.failure, None);
        let identity = result.identity.expect("identity");
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.uid, "alice");
        assert_eq!(identity.groups, vec!["dev"]);
    }

    #[test]
    fn issued_claims_span_one_day() {
        let key = secret("k1");
        let token = issue_token_at(&alice(), &key, NOW).expect("issue");
        let payload = token.token.split('.').nth(1).expect("payload");
        let claims: Claims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).expect("b64")).expect("json");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, claims.iat + 86_400);
        assert_eq!(claims.uid, "alice");
    }

    #[test]
    fn issuance_is_deterministic_for_fixed_clock() {
        let key = secret("k1");
        let a = issue_token_at(&alice(), &key, NOW).expect("issue");
        let b = issue_token_at(&alice(), &key, NOW).expect("issue");
        assert_eq!(a, b);
    }

    #[test]
    fn other_secret_fails_signature() {
        let token = issue_token_at(&alice(), &secret("k1"), NOW).expect("issue");
        let result = validate_token_at(&token.token, &secret("k2"), NOW);
        assert!(!result.authenticated);
        assert_eq!(result.failure, Some(TokenFailure::SignatureInvalid));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let key = secret("k1");
        let token = issue_token_at(&alice(), &key, NOW).expect("issue");
        let mut parts: Vec<String> = token.token.split('.').map(str::to_string).collect();
        let forged = serde_json::json!({
            "iat": NOW,
            "exp": NOW + 86_400,
            "username": "mallory",
            "uid": "mallory",
            "groups": ["system:masters"],
        });
        parts[1] = URL_SAFE_NO_PAD.encode(forged.to_string());
        let result = validate_token_at(&parts.join("."), &key, NOW);
        assert_eq!(result.failure, Some(TokenFailure::SignatureInvalid));
    }

    #[test]
    fn expired_token_fails_even_with_valid_signature() {
        let key = secret("k1");
        let token = issue_token_at(&alice(), &key, NOW).expect("issue");
        let result = validate_token_at(&token.token, &key, token.expiry + 1);
        assert_eq!(
            result.failure,
            Some(TokenFailure::Claim(ClaimViolation::Expired))
        );
        let at_expiry = validate_token_at(&token.token, &key, token.expiry);
        assert!(at_expiry.authenticated);
    }

    #[test]
    fn future_issued_at_is_rejected_beyond_skew() {
        let key = secret("k1");
        let within = issue_token_at(&alice(), &key, NOW + 1).expect("issue");
        assert!(validate_token_at(&within.token, &key, NOW).authenticated);

        let beyond = issue_token_at(&alice(), &key, NOW + 2).expect("issue");
        assert_eq!(
            validate_token_at(&beyond.token, &key, NOW).failure,
            Some(TokenFailure::Claim(ClaimViolation::IssuedInFuture))
        );
    }

    #[test]
    fn missing_uid_and_expiry_are_claim_failures() {
        let key = secret("k1");
        let no_uid = sign_raw(
            &serde_json::json!({"iat": NOW, "exp": NOW + 60, "username": "alice"}),
            "k1",
        );
        assert_eq!(
            validate_token_at(&no_uid, &key, NOW).failure,
            Some(TokenFailure::Claim(ClaimViolation::MissingUid))
        );

        let no_exp = sign_raw(
            &serde_json::json!({"iat": NOW, "username": "alice", "uid": "alice"}),
            "k1",
        );
        assert_eq!(
            validate_token_at(&no_exp, &key, NOW).failure,
            Some(TokenFailure::Claim(ClaimViolation::MissingExpiry))
        );
    }

    #[test]
    fn null_groups_decode_as_empty() {
        let key = secret("k1");
        let token = sign_raw(
            &serde_json::json!({
                "iat": NOW,
                "exp": NOW + 60,
                "username": "svc",
                "uid": "svc-1",
                "groups": null,
            }),
            "k1",
        );
        let result = validate_token_at(&token, &key, NOW);
        let identity = result.identity.expect("identity");
        assert!(identity.groups.is_empty());
        assert_eq!(identity.uid, "svc-1");
    }

    #[test]
    fn asymmetric_algorithm_is_rejected_before_signature_check() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({"iat": NOW, "exp": NOW + 60, "uid": "alice"}).to_string(),
        );
        let token = format!("{header}.{payload}.c2lnbmF0dXJl");
        assert_eq!(
            validate_token_at(&token, &secret("k1"), NOW).failure,
            Some(TokenFailure::AlgorithmRejected("RS256".to_string()))
        );
    }

    #[test]
    fn longer_hmac_variants_are_accepted() {
        let key = secret("k1");
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &serde_json::json!({"iat": NOW, "exp": NOW + 60, "username": "a", "uid": "a"}),
            &EncodingKey::from_secret(b"k1"),
        )
        .expect("encode");
        assert!(validate_token_at(&token, &key, NOW).authenticated);
    }

    #[test]
    fn garbage_tokens_are_malformed() {
        let key = secret("k1");
        for token in ["not-a-jwt", "", "a.b", "a.b.c.d", "!!!.e30.sig"] {
            assert_eq!(
                validate_token_at(token, &key, NOW).failure,
                Some(TokenFailure::Malformed),
                "{token}"
            );
        }

        let no_alg = URL_SAFE_NO_PAD.encode(r#"{"typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(r#"{"uid":"alice","exp":9999999999}"#);
        assert_eq!(
            validate_token_at(&format!("{no_alg}.{payload}.sig"), &key, NOW).failure,
            Some(TokenFailure::Malformed)
        );
    }

    #[test]
    fn unsigned_and_unknown_algorithms_are_rejected() {
        let key = secret("k1");
        let payload = URL_SAFE_NO_PAD.encode(r#"{"uid":"alice","exp":9999999999}"#);
        for alg in ["none", "ES256K", "hs256"] {
            let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{alg}","typ":"JWT"}}"#));
            let token = format!("{header}.{payload}.");
            assert_eq!(
                validate_token_at(&token, &key, NOW).failure,
                Some(TokenFailure::AlgorithmRejected(alg.to_string())),
                "{alg}"
            );
        }
    }

    #[test]
    fn validate_claims_checks_in_order() {
        let base = Claims {
            iat: NOW,
            exp: NOW + 10,
            username: "alice".to_string(),
            uid: "alice".to_string(),
            groups: vec![],
        };
        assert_eq!(validate_claims(&base, NOW), Ok(()));
        assert_eq!(
            validate_claims(
                &Claims {
                    uid: String::new(),
                    exp: 0,
                    ..base.clone()
                },
                NOW
            ),
            Err(ClaimViolation::MissingUid)
        );
        assert_eq!(
            validate_claims(&Claims { exp: 0, ..base.clone() }, NOW),
            Err(ClaimViolation::MissingExpiry)
        );
        assert_eq!(
            validate_claims(&base, NOW + 11),
            Err(ClaimViolation::Expired)
        );
    }
}
