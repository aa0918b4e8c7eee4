//! Endpoint methods on `ApiClient`, one module per console area.
//!
//! Request bodies are validated before anything is sent, so a malformed
//! form never reaches the network.

mod attendance;
mod auth;
mod employees;
mod holidays;
mod leaves;
