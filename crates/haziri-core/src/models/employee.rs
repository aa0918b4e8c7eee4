//! Employee administration models.

use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Minimum length of a new employee password.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Row of the employee list table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListItem {
    pub id: i64,
    pub employee_id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub gender: String,
    pub employee_role_id: i64,
    #[serde(default)]
    pub employee_role_name: String,
    pub designation_id: i64,
    #[serde(default)]
    pub designation_name: String,
    /// 1 for active, 0 for inactive
    pub is_active: i32,
}

impl EmployeeListItem {
    pub fn active(&self) -> bool {
        self.is_active != 0
    }
}

/// Full employee record, used for editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetail {
    pub id: i64,
    pub employee_id: i64,
    pub name: String,
    #[serde(default)]
    pub employee_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub gender: String,
    pub designation_id: i64,
    pub employee_role_id: i64,
    pub is_active: i32,
}

/// Body of the create and update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub name: String,
    pub designation_id: i64,
    pub employee_role_id: i64,
    pub gender: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub is_active: i32,
}

impl EmployeeRequest {
    /// Checks for a new employee; a password is mandatory.
    pub fn validate_create(&self) -> Result<(), ApiError> {
        if self.password.is_none() {
            return Err(ApiError::Validation(
                "A password is required for new employees".to_string(),
            ));
        }
        self.validate_update()
    }

    /// Checks for an edit; the password is only validated when changing it.
    pub fn validate_update(&self) -> Result<(), ApiError> {
        if self.name.trim().chars().count() < 2 {
            return Err(ApiError::Validation(
                "Name must be at least 2 characters".to_string(),
            ));
        }
        if self.phone.len() != 10 || !self.phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::Validation(format!(
                "Phone '{}' must be exactly 10 digits",
                self.phone
            )));
        }
        if self.gender.trim().is_empty() {
            return Err(ApiError::Validation("Gender is required".to_string()));
        }
        if self.employee_role_id <= 0 {
            return Err(ApiError::Validation("A role must be selected".to_string()));
        }
        if self.designation_id <= 0 {
            return Err(ApiError::Validation(
                "A designation must be selected".to_string(),
            ));
        }
        if let Some(ref password) = self.password {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(ApiError::Validation(format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LENGTH
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Designation {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub role_name: String,
}
