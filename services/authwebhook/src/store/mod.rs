//! Credential store abstraction.
//!
//! # Purpose
//! Read-only lookup from username to the stored credential record. The store
//! is populated once at startup and shared by every request afterwards.
//!
//! # Notes
//! Directory-service backends plug in behind [`CredentialStore`]; only the
//! static YAML backend in [`memory`] ships today.
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub mod memory;

/// One entry of the user-details document.
#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("uid", &self.uid)
            .field("groups", &self.groups)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read user details {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse user details: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn lookup(&self, username: &str) -> StoreResult<Option<UserRecord>>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn backend_name(&self) -> &'static str;
}
