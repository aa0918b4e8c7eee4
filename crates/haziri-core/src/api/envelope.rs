//! The uniform response envelope every backend endpoint returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub validation_errors: Option<Vec<String>>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub stack_trace: Option<String>,
    #[serde(default)]
    pub inner_exception: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Turn a `success: false` envelope into `ApiError::Rejected`.
    fn check(self) -> Result<Self, ApiError> {
        if self.success {
            return Ok(self);
        }
        let mut errors = Vec::new();
        let mut message = self.message;
        if let Some(detail) = self.error {
            if message.trim().is_empty() {
                message = detail.error_message.clone();
            } else if !detail.error_message.is_empty() && detail.error_message != message {
                errors.push(detail.error_message);
            }
            errors.extend(detail.validation_errors.unwrap_or_default());
        }
        if message.trim().is_empty() {
            message = "Request was rejected by the server".to_string();
        }
        Err(ApiError::Rejected { message, errors })
    }

    /// The payload of a successful response. A missing payload is an error.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.check()?
            .data
            .ok_or_else(|| ApiError::InvalidResponse("Response has no data".to_string()))
    }

    /// The payload of a successful response, which may legitimately be `null`.
    pub fn into_optional(self) -> Result<Option<T>, ApiError> {
        Ok(self.check()?.data)
    }

    /// The server's message for endpoints whose payload is irrelevant.
    pub fn into_message(self) -> Result<String, ApiError> {
        Ok(self.check()?.message)
    }
}
