//! Webhook HTTP API module.
//!
//! # Purpose
//! Exposes the route handlers, wire types, and the response status table.
pub mod authenticate;
pub mod authorize;
pub mod error;
pub mod login;
pub mod openapi;
pub mod system;
pub mod types;
