#![allow(dead_code)]

use authwebhook::app::{AppState, build_router};
use authwebhook::auth::policy::{AllowAll, AuthorizationPolicy};
use authwebhook::auth::token::SigningSecret;
use authwebhook::store::memory::InMemoryCredentialStore;
use axum::body::Body;
use axum::http::Request;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;

pub const SECRET: &str = "integration-secret";

pub const USERS: &str = r#"
userDetails:
  alice:
    userName: alice
    password: wonderland
    email: alice@example.com
    uid: ""
    groups: [dev, dev, ops]
  bob:
    userName: ""
    password: builder
    uid: "1002"
"#;

pub fn state_with_policy(policy: Arc<dyn AuthorizationPolicy>) -> AppState {
    let store = InMemoryCredentialStore::from_yaml_str(USERS).expect("users");
    AppState::new(
        SigningSecret::new(SECRET).expect("secret"),
        Arc::new(store),
        policy,
    )
}

pub fn app() -> axum::routing::RouterIntoService<Body, ()> {
    build_router(state_with_policy(Arc::new(AllowAll))).into_service()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn login_request(username: &str, password: &str) -> Request<Body> {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    Request::builder()
        .method("POST")
        .uri("/v0/login")
        .header("authorization", format!("Basic {encoded}"))
        .body(Body::empty())
        .expect("request")
}

pub fn review_request(token: &str) -> Request<Body> {
    json_request(
        "POST",
        "/v0/authenticate",
        serde_json::json!({
            "apiVersion": "authentication.k8s.io/v1beta1",
            "kind": "TokenReview",
            "spec": { "token": token }
        }),
    )
}

pub fn bearer_request(body: serde_json::Value, authorization: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v0/authenticate")
        .header("content-type", "application/json")
        .header("authorization", authorization)
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
