//! Authentication payloads and the signed-in user's identity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(phone: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.phone.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "Phone number and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Data of a successful login or token refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// ISO-8601 timestamp, kept as the backend sent it
    pub expires_at: String,
    pub employee: EmployeeInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// Some backends only read the refresh token; the access token is sent
    /// (possibly empty) for those that want both.
    pub access_token: String,
    pub refresh_token: String,
}

/// Identity of the signed-in employee, stored verbatim with the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInfo {
    /// The backend spells this field `empoyeeId`.
    #[serde(rename = "empoyeeId", alias = "employeeId")]
    pub employee_id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub designation_id: i64,
    #[serde(default)]
    pub designation_name: String,
    #[serde(default)]
    pub has_attendance: bool,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    /// Fields this client does not model, kept so the blob round-trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmployeeInfo {
    pub fn roles(&self) -> Vec<String> {
        self.role_name.iter().cloned().collect()
    }

    /// Overlay the editable profile fields onto the stored identity.
    pub fn with_profile(&self, profile: &EmployeeProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            designation_name: profile.designation_name.clone(),
            ..self.clone()
        }
    }
}

/// The admin's own profile as returned by `/admin/employees/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    #[serde(default, alias = "id")]
    pub employee_id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub designation_id: i64,
    #[serde(default)]
    pub designation_name: String,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UpdateProfile {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("Name is required".to_string()));
        }
        if self.phone.trim().is_empty() {
            return Err(ApiError::Validation("Phone is required".to_string()));
        }
        if !is_plausible_email(&self.email) {
            return Err(ApiError::Validation(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(' ')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPLOYEE_JSON: &str = r#"{
        "empoyeeId": 1006,
        "name": "Nooruddin Md Afsar",
        "email": "noor@example.com",
        "phone": "8797905664",
        "isActive": true,
        "designationId": 2,
        "designationName": "Software Engineer",
        "hasAttendance": true,
        "gender": null,
        "department": "Engineering"
    }"#;

    #[test]
    fn test_employee_info_preserves_unknown_fields() {
        let info: EmployeeInfo = serde_json::from_str(EMPLOYEE_JSON).unwrap();
        assert_eq!(info.employee_id, 1006);
        assert_eq!(info.gender, None);
        assert_eq!(info.role_name, None);
        assert_eq!(info.extra.get("department"), Some(&Value::from("Engineering")));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["empoyeeId"], 1006);
        assert_eq!(json["department"], "Engineering");
        assert!(json.get("roleName").is_none());
    }

    #[test]
    fn test_login_response_parses() {
        let json = format!(
            r#"{{"accessToken":"a","refreshToken":"r","expiresAt":"2025-11-01T10:00:00Z","employee":{}}}"#,
            EMPLOYEE_JSON
        );
        let response: LoginResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(response.access_token, "a");
        assert_eq!(response.employee.name, "Nooruddin Md Afsar");
    }

    #[test]
    fn test_login_validation() {
        assert!(LoginRequest::new("9876543210", "secret").validate().is_ok());
        assert!(matches!(
            LoginRequest::new("  ", "secret").validate(),
            Err(ApiError::Validation(_))
        ));
        assert!(LoginRequest::new("9876543210", "").validate().is_err());
    }

    #[test]
    fn test_profile_overlay_keeps_identity() {
        let info: EmployeeInfo = serde_json::from_str(EMPLOYEE_JSON).unwrap();
        let profile = EmployeeProfile {
            employee_id: 1006,
            name: "Noor Afsar".to_string(),
            email: "afsar@example.com".to_string(),
            phone: "8797905664".to_string(),
            is_active: true,
            designation_id: 5,
            designation_name: "Senior Software Engineer".to_string(),
            gender: Some("Male".to_string()),
        };

        let updated = info.with_profile(&profile);
        assert_eq!(updated.name, "Noor Afsar");
        assert_eq!(updated.designation_name, "Senior Software Engineer");
        // Only the editable fields move
        assert_eq!(updated.designation_id, 2);
        assert_eq!(updated.gender, None);
        assert_eq!(updated.extra, info.extra);
    }

    #[test]
    fn test_update_profile_validation() {
        let mut request = UpdateProfile {
            name: "Super Admin".to_string(),
            email: "admin@haziri.com".to_string(),
            phone: "9999999999".to_string(),
            password: None,
        };
        assert!(request.validate().is_ok());

        request.email = "admin.haziri.com".to_string();
        assert!(request.validate().is_err());

        request.email = "@haziri.com".to_string();
        assert!(request.validate().is_err());
    }
}
