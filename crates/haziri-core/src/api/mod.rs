//! REST API client for the Haziri admin backend.
//!
//! Every request passes through the `RequestPipeline`, which attaches the
//! client type and bearer token, refreshes tokens close to expiry, and
//! recovers once from a 401 by refreshing and replaying the request.
//!
//! Responses share one envelope (`ApiResponse`); a `success: false` envelope
//! surfaces as `ApiError::Rejected` with the server's message.

pub mod client;
pub mod envelope;
pub mod error;
pub mod pipeline;

pub use client::ApiClient;
pub use envelope::{ApiResponse, ErrorDetail};
pub use error::ApiError;
pub use pipeline::{is_anonymous, RequestPipeline, APP_TYPE_HEADER};
