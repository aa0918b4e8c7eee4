//! Core library for the Haziri admin console.
//!
//! Provides the authenticated API client, session persistence, and the
//! wire models for employees, attendance, leave and holidays. Front ends
//! (currently the `haziri` CLI) build on `ApiClient`.
//!
//! # Modules
//!
//! - `api`: HTTP client, response envelope and the authenticated request pipeline
//! - `auth`: session store, storage backends and the token refresh coordinator
//! - `config`: user configuration and environment overrides
//! - `models`: request and response types
//! - `services`: endpoint methods on `ApiClient`

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod services;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthEvent, RefreshError, Session, SessionStore};
pub use config::Config;
