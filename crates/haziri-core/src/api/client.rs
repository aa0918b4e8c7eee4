//! API client for the Haziri admin backend.
//!
//! `ApiClient` owns the HTTP connection pool and the request pipeline. The
//! endpoint methods live in `crate::services`, grouped by feature area.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use super::envelope::ApiResponse;
use super::pipeline::RequestPipeline;
use super::ApiError;
use crate::auth::{open_storage, AuthEvent, RefreshCoordinator, RefreshError, SessionStore};
use crate::config::Config;

/// API client for the Haziri backend.
/// Clone is cheap: the pipeline and connection pool are shared.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<RequestPipeline>,
    base_url: String,
}

impl ApiClient {
    /// Build a client over an existing session store.
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;
        let coordinator = Arc::new(RefreshCoordinator::new(session));
        let pipeline = RequestPipeline::new(http, &config.app_type, config.base_url(), coordinator)?;

        Ok(Self {
            pipeline: Arc::new(pipeline),
            base_url: config.base_url().to_string(),
        })
    }

    /// Open the configured session storage, restore any persisted session,
    /// and build a client over it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = open_storage(config)?;
        let session = Arc::new(SessionStore::new(storage, config.refresh_threshold()));
        if session.restore() {
            debug!("Restored persisted session");
        }
        Self::new(config, session).context("Failed to create API client")
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.pipeline.session()
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        self.pipeline.coordinator()
    }

    /// Receive session lifecycle events, e.g. to send the user back to login.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.coordinator().subscribe()
    }

    /// Force a token refresh through the shared coordinator.
    pub async fn refresh_session(&self) -> Result<String, RefreshError> {
        self.pipeline.refresh().await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let request = builder.build()?;
        let response = self.pipeline.execute(request).await?;
        Self::check_response(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let response = self.send(builder).await?;
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        let builder = self.pipeline.http().get(self.url(path));
        self.send_json(builder).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        let builder = self.pipeline.http().post(self.url(path)).json(body);
        self.send_json(builder).await
    }

    /// POST without a request body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        let builder = self.pipeline.http().post(self.url(path));
        self.send_json(builder).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        let builder = self.pipeline.http().put(self.url(path)).json(body);
        self.send_json(builder).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        let builder = self.pipeline.http().delete(self.url(path));
        self.send_json(builder).await
    }

    /// POST and return the raw response body, for spreadsheet exports.
    pub(crate) async fn post_for_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, ApiError> {
        let builder = self.pipeline.http().post(self.url(path)).json(body);
        let response = self.send(builder).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;

    fn client(api_url: &str) -> ApiClient {
        let config = Config {
            api_url: api_url.to_string(),
            ..Config::default()
        };
        let session = Arc::new(SessionStore::with_default_threshold(Box::new(
            MemoryStorage::new(),
        )));
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let client = client("http://localhost:8080/api/");
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(
            client.url("/admin/holidays/list"),
            "http://localhost:8080/api/admin/holidays/list"
        );
    }

    #[test]
    fn test_invalid_app_type_is_rejected() {
        let config = Config {
            app_type: "Haziri\nAdmin".to_string(),
            ..Config::default()
        };
        let session = Arc::new(SessionStore::with_default_threshold(Box::new(
            MemoryStorage::new(),
        )));
        assert!(matches!(
            ApiClient::new(&config, session),
            Err(ApiError::Validation(_))
        ));
    }
}
