//! Token-auth webhook HTTP service entry point.
//!
//! # Purpose
//! Loads configuration, builds the credential store and signing secret once,
//! then serves the webhook API and the metrics endpoint until Ctrl-C.
//!
//! # Notes
//! The API is served over HTTPS when a certificate and key are configured,
//! and over plain HTTP otherwise.
use anyhow::Context;
use authwebhook::app::{build_router, build_state};
use authwebhook::config::{AuthWebhookConfig, TlsMaterial};
use authwebhook::observability;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AuthWebhookConfig::from_env_or_yaml().context("webhook config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: AuthWebhookConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("auth-webhook")?;
    let state = build_state(&config)?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);
    let result = match &config.tls {
        Some(tls) => serve_tls(app, config.bind_addr, tls, shutdown).await,
        None => serve_plain(app, config.bind_addr, shutdown).await,
    };
    tracing::info!("auth webhook stopped");

    metrics_task.abort();
    let _ = metrics_task.await;
    result
}

async fn serve_plain<F>(app: Router, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    let addr = listener.local_addr()?;
    tracing::warn!(%addr, "no TLS certificate configured, serving plain HTTP");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn serve_tls<F>(
    app: Router,
    addr: SocketAddr,
    tls: &TlsMaterial,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let rustls = RustlsConfig::from_pem(tls.cert_pem.clone(), tls.key_pem.clone())
        .await
        .context("load TLS certificate and key")?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
    });
    tracing::info!(%addr, "auth webhook listening with TLS");
    axum_server::bind_rustls(addr, rustls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .with_context(|| format!("serve TLS on {addr}"))?;
    Ok(())
}
