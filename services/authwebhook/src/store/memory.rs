//! In-memory credential store loaded from a user-details YAML document.
//!
//! # Purpose
//! Holds every user record in a `HashMap` keyed by username. The map is built
//! exactly once, by the constructor, and never mutated afterwards, so lookups
//! need no locking.
//!
//! # Document shape
//! ```yaml
//! userDetails:
//!   alice:
//!     userName: alice
//!     password: secret1
//!     email: alice@example.com
//!     uid: ""
//!     groups: [dev]
//! ```
//! An empty `userName` is replaced by the map key.
use crate::store::{CredentialStore, StoreError, StoreResult, UserRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct UserDetailsDocument {
    #[serde(rename = "userDetails", default)]
    user_details: HashMap<String, UserRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: HashMap<String, UserRecord>,
}

impl InMemoryCredentialStore {
    pub fn new(users: HashMap<String, UserRecord>) -> Self {
        let users = users
            .into_iter()
            .map(|(key, mut record)| {
                if record.user_name.is_empty() {
                    record.user_name = key.clone();
                }
                (key, record)
            })
            .collect();
        Self { users }
    }

    pub fn from_yaml_str(contents: &str) -> StoreResult<Self> {
        let document: UserDetailsDocument = serde_yaml::from_str(contents)?;
        Ok(Self::new(document.user_details))
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_yaml_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            users = store.users.len(),
            "loaded user details"
        );
        Ok(store)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.get(username).cloned())
    }

    fn len(&self) -> usize {
        self.users.len()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
