//! Authenticated request pipeline.
//!
//! Every outgoing request goes through `RequestPipeline::execute`, which
//! decides what credentials to attach:
//!
//! 1. `X-App-Type` is always set.
//! 2. Login and token-refresh requests are sent without a bearer token.
//! 3. Without a stored token the request goes out as-is.
//! 4. A token close to expiry is refreshed before the request is sent.
//! 5. Otherwise the bearer token is attached, and a 401 triggers one refresh
//!    and one replay with the new token. If the session changed while the
//!    request was in flight, the 401 is answered from the current session
//!    instead of starting another refresh.
//!
//! Refreshes go through the shared `RefreshCoordinator`, so concurrent
//! requests never start more than one refresh call.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response, StatusCode};
use tracing::{debug, warn};

use super::envelope::ApiResponse;
use super::ApiError;
use crate::auth::{RefreshCoordinator, RefreshError, SessionStore};
use crate::models::{LoginResponse, RefreshTokenRequest};

/// Header identifying this client to the backend
pub const APP_TYPE_HEADER: &str = "x-app-type";

/// Login endpoint, relative to the API base URL
pub const LOGIN_PATH: &str = "/auth/login";

/// Token refresh endpoint, relative to the API base URL
pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Endpoints that must never carry a bearer token.
const ANONYMOUS_ENDPOINTS: [&str; 2] = [LOGIN_PATH, REFRESH_PATH];

/// Whether `url` targets an endpoint that is called without credentials.
pub fn is_anonymous(url: &str) -> bool {
    ANONYMOUS_ENDPOINTS
        .iter()
        .any(|endpoint| url.contains(endpoint))
}

pub struct RequestPipeline {
    http: Client,
    app_type: HeaderValue,
    refresh_url: String,
    coordinator: Arc<RefreshCoordinator>,
}

impl RequestPipeline {
    pub fn new(
        http: Client,
        app_type: &str,
        base_url: &str,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Result<Self, ApiError> {
        let app_type = HeaderValue::from_str(app_type).map_err(|_| {
            ApiError::Validation(format!("'{}' is not a valid client type", app_type))
        })?;
        Ok(Self {
            http,
            app_type,
            refresh_url: format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH),
            coordinator,
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.coordinator.session()
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Send `request` with the credentials the session calls for.
    ///
    /// Returns the response for any status except a 401 that could not be
    /// recovered by refreshing, which becomes `ApiError::Unauthorized`.
    pub async fn execute(&self, mut request: Request) -> Result<Response, ApiError> {
        request
            .headers_mut()
            .insert(APP_TYPE_HEADER, self.app_type.clone());

        if is_anonymous(request.url().as_str()) {
            request.headers_mut().remove(AUTHORIZATION);
            return self.send(request).await;
        }

        let generation = self.session().generation();
        let Some(token) = self.session().access_token() else {
            debug!(url = %request.url(), "No session token, sending without credentials");
            return self.send(request).await;
        };

        if self.session().is_near_expiry() {
            debug!(url = %request.url(), "Access token near expiry, refreshing first");
            let token = self.refresh().await?;
            return self.send(authorize(request, &token)?).await;
        }

        let replay = request.try_clone().ok_or_else(|| {
            ApiError::Validation("Request body cannot be replayed after a refresh".to_string())
        })?;

        let response = self.send(authorize(request, &token)?).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // Another request may have settled a refresh while this one was out.
        if self.session().generation() != generation {
            match self.session().access_token() {
                None => {
                    debug!(url = %replay.url(), "Request denied after the session ended");
                    return Err(ApiError::Unauthorized);
                }
                Some(current) if current != token => {
                    debug!(url = %replay.url(), "Request denied with a replaced token, replaying");
                    return self.send(authorize(replay, &current)?).await;
                }
                Some(_) => {}
            }
        }

        warn!(url = %replay.url(), "Request denied, refreshing session");
        match self.refresh().await {
            Ok(token) => self.send(authorize(replay, &token)?).await,
            Err(e) => {
                debug!(error = %e, "Refresh after denial failed");
                Err(ApiError::Unauthorized)
            }
        }
    }

    /// Obtain a new access token through the coordinator.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        self.coordinator
            .refresh(|body| self.request_refresh(body))
            .await
    }

    async fn send(&self, request: Request) -> Result<Response, ApiError> {
        debug!(method = %request.method(), url = %request.url(), "Sending request");
        Ok(self.http.execute(request).await?)
    }

    /// The refresh network call. Only the episode leader runs this.
    async fn request_refresh(
        &self,
        body: RefreshTokenRequest,
    ) -> Result<LoginResponse, RefreshError> {
        let mut request = self
            .http
            .post(&self.refresh_url)
            .json(&body)
            .build()
            .map_err(|e| RefreshError::Transport(e.to_string()))?;
        request
            .headers_mut()
            .insert(APP_TYPE_HEADER, self.app_type.clone());

        let response = self
            .send(request)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = ApiError::from_status(status, &body).to_string();
            return Err(if status.is_server_error() {
                RefreshError::Transport(error)
            } else {
                RefreshError::Rejected(error)
            });
        }

        let envelope: ApiResponse<LoginResponse> = response
            .json()
            .await
            .map_err(|e| RefreshError::Transport(format!("Failed to parse refresh response: {}", e)))?;

        envelope.into_data().map_err(|e| match e {
            ApiError::Rejected { message, .. } => RefreshError::Rejected(message),
            other => RefreshError::Transport(other.to_string()),
        })
    }
}

/// Attach `Authorization: Bearer <token>`.
fn authorize(mut request: Request, token: &str) -> Result<Request, ApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        ApiError::InvalidResponse("Access token is not a valid header value".to_string())
    })?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_endpoints() {
        assert!(is_anonymous("https://host/api/auth/login"));
        assert!(is_anonymous("https://host/api/auth/refresh-token"));
        assert!(!is_anonymous("https://host/api/auth/logout"));
        assert!(!is_anonymous("https://host/api/auth/validate-token"));
        assert!(!is_anonymous("https://host/api/admin/employees/list"));
        assert!(is_anonymous("https://host/api/auth/login?next=1"));
        assert!(is_anonymous("https://host/v2/auth/refresh-token"));
    }

    #[test]
    fn test_authorize_sets_sensitive_bearer() {
        let request = Client::new()
            .get("http://localhost/api/admin/holidays/list")
            .build()
            .unwrap();
        let request = authorize(request, "abc.def").unwrap();
        let value = request.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc.def");
        assert!(value.is_sensitive());

        let request = Client::new().get("http://localhost/").build().unwrap();
        assert!(authorize(request, "bad\ntoken").is_err());
    }
}
