//! Webhook HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and testable.
use crate::api;
use crate::api::error::FailureKind;
use crate::api::openapi::ApiDoc;
use crate::auth::credentials::CredentialValidator;
use crate::auth::policy::{AllowAll, AuthorizationPolicy};
use crate::auth::token::SigningSecret;
use crate::config::AuthWebhookConfig;
use crate::store::CredentialStore;
use crate::store::memory::InMemoryCredentialStore;
use anyhow::Context;
use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Version reported by `/health`.
pub const BUILD_VERSION: &str = match option_env!("AUTH_WEBHOOK_BUILD_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

#[derive(Clone)]
pub struct AppState {
    pub signing_secret: Arc<SigningSecret>,
    pub credentials: CredentialValidator,
    pub authorization_policy: Arc<dyn AuthorizationPolicy>,
    pub build_version: String,
}

impl AppState {
    pub fn new(
        signing_secret: SigningSecret,
        store: Arc<dyn CredentialStore>,
        authorization_policy: Arc<dyn AuthorizationPolicy>,
    ) -> Self {
        Self {
            signing_secret: Arc::new(signing_secret),
            credentials: CredentialValidator::new(store),
            authorization_policy,
            build_version: BUILD_VERSION.to_string(),
        }
    }
}

/// Validate configuration and load the user store once.
///
/// # Errors
/// Fails on missing configuration, an empty secret, or an unreadable user
/// details file.
pub fn build_state(config: &AuthWebhookConfig) -> anyhow::Result<AppState> {
    if let Err(err) = config.validate() {
        tracing::error!(
            failure = FailureKind::from(&err).as_str(),
            error = %err,
            "invalid webhook configuration"
        );
        return Err(err).context("validate webhook configuration");
    }
    let key = config
        .signing_key
        .as_deref()
        .context("signing key missing")?;
    let secret = SigningSecret::new(key).context("build signing secret")?;
    let path = config
        .user_details_path
        .as_deref()
        .context("user details path missing")?;
    let store = InMemoryCredentialStore::load(path)
        .with_context(|| format!("load user details: {}", path.display()))?;
    let state = AppState::new(secret, Arc::new(store), Arc::new(AllowAll));
    let store = state.credentials.store();
    tracing::info!(
        backend = store.backend_name(),
        users = store.len(),
        "credential store ready"
    );
    Ok(state)
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    Router::new()
        .route("/health", axum::routing::get(api::system::health))
        .route("/v0/login", axum::routing::post(api::login::login))
        .route(
            "/v0/authenticate",
            axum::routing::post(api::authenticate::authenticate),
        )
        .route(
            "/v0/authorize",
            axum::routing::post(api::authorize::authorize),
        )
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/v0/openapi.json", ApiDoc::openapi()),
        )
        .fallback(api::error::not_found)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(trace_layer)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserSource;
    use std::path::PathBuf;

    fn config(signing_key: Option<&str>, users: Option<PathBuf>) -> AuthWebhookConfig {
        AuthWebhookConfig {
            bind_addr: "127.0.0.1:0".parse().expect("bind"),
            metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
            signing_key: signing_key.map(str::to_string),
            user_source: UserSource::File,
            user_details_path: users,
            tls: None,
        }
    }

    #[test]
    fn build_state_requires_signing_key() {
        let err = build_state(&config(None, Some(PathBuf::from("users.yaml"))))
            .err()
            .expect("missing key");
        assert!(err.to_string().contains("validate webhook configuration"));
    }

    #[test]
    fn build_state_reports_unreadable_user_file() {
        let err = build_state(&config(
            Some("secret"),
            Some(PathBuf::from("/nonexistent/users.yaml")),
        ))
        .err()
        .expect("missing file");
        assert!(err.to_string().contains("load user details"));
    }

    #[test]
    fn build_state_loads_users() {
        let dir = std::env::temp_dir().join(format!("authwebhook-app-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("users.yaml");
        std::fs::write(
            &path,
            "userDetails:\n  alice:\n    userName: alice\n    password: pw\n    uid: \"1\"\n",
        )
        .expect("write");

        let state = build_state(&config(Some("secret"), Some(path))).expect("state");
        assert_eq!(state.credentials.store().len(), 1);
        assert_eq!(state.build_version, BUILD_VERSION);

        let _ = std::fs::remove_dir_all(dir);
    }
}
