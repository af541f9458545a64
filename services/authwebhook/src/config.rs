use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "./config/auth_config.yaml";
pub const TLS_CERT_ENV: &str = "AUTH_CERT_TLS_CRT";
pub const TLS_KEY_ENV: &str = "AUTH_CERT_TLS_KEY";

// Webhook configuration sourced from environment variables, optionally
// overridden by the YAML `authConfig` document.
#[derive(Clone)]
pub struct AuthWebhookConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub signing_key: Option<String>,
    pub user_source: UserSource,
    pub user_details_path: Option<PathBuf>,
    pub tls: Option<TlsMaterial>,
}

impl std::fmt::Debug for AuthWebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthWebhookConfig")
            .field("bind_addr", &self.bind_addr)
            .field("metrics_bind", &self.metrics_bind)
            .field(
                "signing_key",
                &self.signing_key.as_ref().map(|_| "<redacted>"),
            )
            .field("user_source", &self.user_source)
            .field("user_details_path", &self.user_details_path)
            .field("tls", &self.tls)
            .finish()
    }
}

/// PEM certificate chain and private key served over HTTPS.
#[derive(Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("cert_pem_len", &self.cert_pem.len())
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

impl TlsMaterial {
    /// Read the certificate and key from `AUTH_CERT_TLS_CRT` and
    /// `AUTH_CERT_TLS_KEY`. Each value is PEM text or base64-encoded PEM.
    /// Both must be set; with only one of them the server stays on HTTP.
    pub fn from_env() -> Option<Self> {
        match (non_empty_env(TLS_CERT_ENV), non_empty_env(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(Self {
                cert_pem: decode_if_encoded(&cert),
                key_pem: decode_if_encoded(&key),
            }),
            (None, None) => None,
            _ => {
                tracing::warn!(
                    "only one of {TLS_CERT_ENV} and {TLS_KEY_ENV} is set, serving plain HTTP"
                );
                None
            }
        }
    }
}

// Values that are valid standard base64 (line breaks ignored) are decoded;
// anything else, such as raw PEM with its dashes, is used verbatim.
fn decode_if_encoded(value: &str) -> Vec<u8> {
    let compact: String = value.split_whitespace().collect();
    match STANDARD.decode(compact.as_bytes()) {
        Ok(decoded) => decoded,
        Err(_) => value.as_bytes().to_vec(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserSource {
    File,
    Ldap,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing key is not configured")]
    MissingSigningKey,
    #[error("user details file is not configured")]
    MissingUserDetails,
    #[error("user source {0:?} is not supported")]
    UnsupportedSource(UserSource),
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "authConfig")]
    auth_config: Option<AuthConfigOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthConfigOverride {
    server_address: Option<u16>,
    auth_signing_key: Option<String>,
    v0: Option<V0Override>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct V0Override {
    source: Option<UserSource>,
    user_detail_file_path: Option<String>,
}

impl AuthWebhookConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("AUTH_WEBHOOK_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8443".to_string())
            .parse()
            .with_context(|| "parse AUTH_WEBHOOK_BIND")?;
        let metrics_bind = std::env::var("AUTH_WEBHOOK_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9090".to_string())
            .parse()
            .with_context(|| "parse AUTH_WEBHOOK_METRICS_BIND")?;
        Ok(Self {
            bind_addr,
            metrics_bind,
            signing_key: non_empty_env("AUTH_SIGNING_KEY"),
            user_source: UserSource::File,
            user_details_path: non_empty_env("AUTH_USER_DETAILS_FILE").map(PathBuf::from),
            tls: TlsMaterial::from_env(),
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        let path = match std::env::var("CONFIG_FILE") {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                default.exists().then(|| default.to_path_buf())
            }
        };
        if let Some(path) = path {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read CONFIG_FILE: {}", path.display()))?;
            config.apply_yaml_str(&contents)?;
            tracing::info!(path = %path.display(), "loaded webhook config file");
        }
        // The environment secret wins over the file.
        if let Some(key) = non_empty_env("AUTH_SIGNING_KEY") {
            config.signing_key = Some(key);
        }
        Ok(config)
    }

    pub fn apply_yaml_str(&mut self, contents: &str) -> Result<()> {
        if contents.trim().is_empty() {
            return Ok(());
        }
        let file: ConfigFile =
            serde_yaml::from_str(contents).with_context(|| "parse webhook config yaml")?;
        let Some(auth) = file.auth_config else {
            return Ok(());
        };
        if let Some(port) = auth.server_address
            && port != 0
        {
            self.bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        }
        if let Some(key) = auth.auth_signing_key.filter(|key| !key.is_empty()) {
            self.signing_key = Some(key);
        }
        if let Some(v0) = auth.v0 {
            if let Some(source) = v0.source {
                self.user_source = source;
            }
            if let Some(path) = v0.user_detail_file_path.filter(|path| !path.is_empty()) {
                self.user_details_path = Some(PathBuf::from(path));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_key.is_none() {
            return Err(ConfigError::MissingSigningKey);
        }
        match self.user_source {
            UserSource::File => {}
            UserSource::Ldap => return Err(ConfigError::UnsupportedSource(UserSource::Ldap)),
        }
        if self.user_details_path.is_none() {
            return Err(ConfigError::MissingUserDetails);
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
