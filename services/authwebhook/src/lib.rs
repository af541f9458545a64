//! Token-auth webhook library crate.
//!
//! # Purpose
//! Exposes the login, token review, and access review API surface together
//! with the token helpers, configuration, and credential store used by the
//! binary and tests.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod observability;
pub mod store;
