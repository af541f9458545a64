//! Authentication and authorization building blocks.
//!
//! # Purpose
//! Groups identity normalization, credential checks, token extraction, JWT
//! issuance/validation, and the authorization decision seam.
pub mod credentials;
pub mod extract;
pub mod identity;
pub mod policy;
pub mod token;
