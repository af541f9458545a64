//! Username/password validation against the credential store.
//!
//! # Purpose
//! Turns a login attempt into a normalized [`Identity`] or a classified
//! failure. `NotFound` and `InvalidCredentials` are kept apart for logs only;
//! callers must answer both the same way so usernames cannot be enumerated.
//!
//! # Security
//! Stored passwords are plaintext and compared for exact equality. The
//! comparison runs in constant time for equal-length inputs.
use crate::auth::identity::Identity;
use crate::store::{CredentialStore, StoreError};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("user not present")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential store unavailable: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct CredentialValidator {
    store: Arc<dyn CredentialStore>,
}

impl CredentialValidator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Check `username`/`password` and return the stored identity.
    ///
    /// # Errors
    /// - [`CredentialError::NotFound`] for an unknown username.
    /// - [`CredentialError::InvalidCredentials`] for a password mismatch.
    /// - [`CredentialError::Store`] if the backend lookup fails.
    pub async fn validate(&self, username: &str, password: &str) -> Result<Identity, CredentialError> {
        let record = self
            .store
            .lookup(username)
            .await?
            .ok_or(CredentialError::NotFound)?;
        // TODO: accept argon2 PHC hashes in `password` and verify with
        // argon2::PasswordVerifier instead of plaintext comparison.
        if !constant_time_eq(record.password.as_bytes(), password.as_bytes()) {
            return Err(CredentialError::InvalidCredentials);
        }
        let user_name = if record.user_name.is_empty() {
            username.to_string()
        } else {
            record.user_name
        };
        Ok(Identity::new(
            user_name,
            record.uid,
            record.email,
            record.groups.unwrap_or_default(),
        ))
    }
}

// Slices of different length compare unequal without a data-dependent early exit.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}
