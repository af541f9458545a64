//! Authorization decision seam for SubjectAccessReview requests.
//!
//! The webhook does not interpret the review body. A policy receives the raw
//! bytes and returns a [`Decision`]; the shipped default allows everything.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny { .. } => "deny",
        }
    }
}

pub trait AuthorizationPolicy: Send + Sync {
    fn decide(&self, request: &[u8]) -> Decision;
}

/// Allows every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AuthorizationPolicy for AllowAll {
    fn decide(&self, _request: &[u8]) -> Decision {
        Decision::Allow
    }
}

/// Adapts a predicate closure into an [`AuthorizationPolicy`].
pub struct FnPolicy<F>(pub F);

impl<F> AuthorizationPolicy for FnPolicy<F>
where
    F: Fn(&[u8]) -> Decision + Send + Sync,
{
    fn decide(&self, request: &[u8]) -> Decision {
        (self.0)(request)
    }
}

impl<F> fmt::Debug for FnPolicy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnPolicy")
    }
}
