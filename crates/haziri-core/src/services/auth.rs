//! Sign-in, sign-out and session validation.

use serde_json::Value;
use tracing::{info, warn};

use crate::api::pipeline::LOGIN_PATH;
use crate::api::{ApiClient, ApiError, ApiResponse};
use crate::auth::Session;
use crate::models::{EmployeeInfo, EmployeeProfile, LoginRequest, LoginResponse};

const LOGOUT_PATH: &str = "/auth/logout";
const VALIDATE_TOKEN_PATH: &str = "/auth/validate-token";
const PROFILE_PATH: &str = "/admin/employees/profile";

impl ApiClient {
    /// Sign in and persist the returned session.
    pub async fn login(&self, request: &LoginRequest) -> Result<EmployeeInfo, ApiError> {
        request.validate()?;

        let response: ApiResponse<LoginResponse> =
            self.post(LOGIN_PATH, request).await.map_err(|e| match e {
                ApiError::Unauthorized => ApiError::Rejected {
                    message: "Invalid phone number or password".to_string(),
                    errors: Vec::new(),
                },
                other => other,
            })?;
        let session = Session::from(response.into_data()?);

        self.session()
            .store(&session)
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;

        info!(employee_id = session.user.employee_id, "Signed in");
        Ok(session.user)
    }

    /// Sign out. The local session is cleared whatever the backend says;
    /// the returned message is the server's, or a note that only the local
    /// session was cleared.
    pub async fn logout(&self) -> String {
        let message = if self.session().access_token().is_some() {
            match self
                .post_empty::<Value>(LOGOUT_PATH)
                .await
                .and_then(ApiResponse::into_message)
            {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, "Server logout failed, clearing local session anyway");
                    "Signed out locally".to_string()
                }
            }
        } else {
            "No active session".to_string()
        };

        self.session().clear();
        info!("Signed out");
        message
    }

    /// Ask the backend whether the stored token is still good. Any failure
    /// clears the local session.
    pub async fn validate_token(&self) -> Result<(), ApiError> {
        if self.session().access_token().is_none() {
            return Err(ApiError::Unauthorized);
        }

        let result = self
            .get::<Value>(VALIDATE_TOKEN_PATH)
            .await
            .and_then(ApiResponse::into_optional)
            .map(|_| ());

        if let Err(ref e) = result {
            warn!(error = %e, "Token validation failed, clearing session");
            self.session().clear();
        }
        result
    }

    /// Re-read the admin's profile and fold it into the stored identity.
    pub async fn refresh_current_user(&self) -> Result<EmployeeInfo, ApiError> {
        let current = self.session().current_user().ok_or(ApiError::Unauthorized)?;

        let profile: EmployeeProfile = self.get(PROFILE_PATH).await?.into_data()?;
        let updated = current.with_profile(&profile);

        self.session()
            .update_user(&updated)
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;
        Ok(updated)
    }
}
