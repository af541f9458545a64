//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the wire shapes the cluster control plane exchanges with the
//! webhook (TokenReview, SubjectAccessReview) plus the login and error bodies,
//! and their OpenAPI schemas.
use crate::auth::identity::Identity;
use crate::auth::policy::Decision;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const AUTHENTICATION_API_VERSION: &str = "authentication.k8s.io/v1beta1";
pub const TOKEN_REVIEW_KIND: &str = "TokenReview";
pub const AUTHORIZATION_API_VERSION: &str = "authorization.k8s.io/v1";
pub const SUBJECT_ACCESS_REVIEW_KIND: &str = "SubjectAccessReview";

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenReviewRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<TokenReviewSpec>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub struct TokenReviewSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenReview {
    pub api_version: String,
    pub kind: String,
    pub status: TokenReviewStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct TokenReviewStatus {
    pub authenticated: bool,
    pub user: Option<ReviewUser>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ReviewUser {
    pub username: String,
    pub uid: String,
    pub groups: Vec<String>,
}

impl TokenReview {
    pub fn authenticated(identity: &Identity) -> Self {
        Self::with_status(TokenReviewStatus {
            authenticated: true,
            user: Some(ReviewUser {
                username: identity.username.clone(),
                uid: identity.uid.clone(),
                groups: identity.groups.clone(),
            }),
        })
    }

    pub fn unauthenticated() -> Self {
        Self::with_status(TokenReviewStatus {
            authenticated: false,
            user: None,
        })
    }

    fn with_status(status: TokenReviewStatus) -> Self {
        Self {
            api_version: AUTHENTICATION_API_VERSION.to_string(),
            kind: TOKEN_REVIEW_KIND.to_string(),
            status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAccessReview {
    pub api_version: String,
    pub kind: String,
    pub status: SubjectAccessReviewStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct SubjectAccessReviewStatus {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub denied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Decision> for SubjectAccessReview {
    fn from(decision: Decision) -> Self {
        let status = match decision {
            Decision::Allow => SubjectAccessReviewStatus {
                allowed: true,
                denied: false,
                reason: None,
            },
            Decision::Deny { reason } => SubjectAccessReviewStatus {
                allowed: false,
                denied: true,
                reason: Some(reason),
            },
        };
        Self {
            api_version: AUTHORIZATION_API_VERSION.to_string(),
            kind: SUBJECT_ACCESS_REVIEW_KIND.to_string(),
            status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub expiry: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    #[serde(rename = "build.version")]
    pub build_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unauthenticated_review_serializes_null_user() {
        let value = serde_json::to_value(TokenReview::unauthenticated()).expect("json");
        assert_eq!(
            value,
            json!({
                "apiVersion": "authentication.k8s.io/v1beta1",
                "kind": "TokenReview",
                "status": {"authenticated": false, "user": null}
            })
        );
    }

    #[test]
    fn authenticated_review_omits_email() {
        let identity = Identity::new("alice", "", "alice@example.com", vec!["dev".to_string()]);
        let value = serde_json::to_value(TokenReview::authenticated(&identity)).expect("json");
        assert_eq!(
            value["status"]["user"],
            json!({"username": "alice", "uid": "alice", "groups": ["dev"]})
        );
    }

    #[test]
    fn access_review_shapes() {
        let allow = serde_json::to_value(SubjectAccessReview::from(Decision::Allow)).expect("json");
        assert_eq!(
            allow,
            json!({
                "apiVersion": "authorization.k8s.io/v1",
                "kind": "SubjectAccessReview",
                "status": {"allowed": true}
            })
        );

        let deny = serde_json::to_value(SubjectAccessReview::from(Decision::Deny {
            reason: "nope".to_string(),
        }))
        .expect("json");
        assert_eq!(
            deny["status"],
            json!({"allowed": false, "denied": true, "reason": "nope"})
        );
    }

    #[test]
    fn review_request_tolerates_missing_fields() {
        let request: TokenReviewRequest = serde_json::from_str("{}").expect("parse");
        assert!(request.spec.is_none());
        let request: TokenReviewRequest =
            serde_json::from_str(r#"{"spec":{"token":"abc","audiences":["x"]}}"#).expect("parse");
        assert_eq!(request.spec.and_then(|spec| spec.token).as_deref(), Some("abc"));
    }

    #[test]
    fn health_uses_dotted_key() {
        let value = serde_json::to_value(HealthStatus {
            build_version: "1.2.3".to_string(),
        })
        .expect("json");
        assert_eq!(value, json!({"build.version": "1.2.3"}));
    }
}
