//! End-to-end behavior of the authenticated request pipeline against a
//! mock backend.

mod common;

use std::time::Duration;

use futures::future::join_all;
use tokio::sync::broadcast::error::TryRecvError;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use haziri_core::models::{DataTableArg, LoginRequest};
use haziri_core::{ApiError, AuthEvent, RefreshError};

#[tokio::test]
async fn test_login_is_sent_without_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("X-App-Type", APP_TYPE))
        .and(body_json(serde_json::json!({"phone": "8797905664", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_envelope("fresh")))
        .expect(1)
        .mount(&server)
        .await;

    // A stale session must not leak its token into the login call
    let harness = signed_in(&server, "stale", 60);
    let user = harness
        .client
        .login(&LoginRequest::new("8797905664", "secret"))
        .await
        .unwrap();

    assert_eq!(user.employee_id, 1006);
    assert_eq!(harness.session().access_token().as_deref(), Some("fresh"));
    assert!(harness.session().is_authenticated());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_valid_token_sends_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/employees/list"))
        .and(header("Authorization", "Bearer current"))
        .and(header("X-App-Type", APP_TYPE))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "data": [],
            "totalRecords": 0
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_envelope("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let harness = signed_in(&server, "current", 60);
    let page = harness
        .client
        .fetch_employees(&DataTableArg::default())
        .await
        .unwrap();

    assert_eq!(page.total_records, 0);
    assert_eq!(harness.client.coordinator().refresh_calls(), 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_request_without_session_carries_no_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/holidays/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(holidays_json()))
        .expect(1)
        .mount(&server)
        .await;

    let harness = harness(&server);
    harness.client.fetch_holidays().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[0].headers.get("x-app-type").unwrap().to_str().unwrap(),
        APP_TYPE
    );
}

#[tokio::test]
async fn test_concurrent_near_expiry_requests_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .and(body_json(serde_json::json!({
            "accessToken": "expiring",
            "refreshToken": "expiring-refresh"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(login_envelope("renewed"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/holidays/list"))
        .and(header("Authorization", "Bearer renewed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(holidays_json()))
        .expect(3)
        .mount(&server)
        .await;

    // Two minutes left is inside the five-minute threshold
    let harness = signed_in(&server, "expiring", 2);
    let mut events = harness.client.subscribe();

    let results = join_all((0..3).map(|_| harness.client.fetch_holidays())).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(harness.client.coordinator().refresh_calls(), 1);
    assert_eq!(harness.session().access_token().as_deref(), Some("renewed"));
    assert_eq!(
        harness.session().refresh_token().as_deref(),
        Some("renewed-refresh")
    );
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SessionRefreshed);
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_denied_request_is_replayed_after_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/holidays/list"))
        .and(header("Authorization", "Bearer revoked"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/holidays/list"))
        .and(header("Authorization", "Bearer renewed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(holidays_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_envelope("renewed")))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_in(&server, "revoked", 60);
    let holidays = harness.client.fetch_holidays().await.unwrap();

    assert_eq!(holidays[0].holiday_name, "Diwali");
    assert_eq!(harness.session().access_token().as_deref(), Some("renewed"));
}

#[tokio::test]
async fn test_denied_post_replays_same_body() {
    let server = MockServer::start().await;
    let expected = serde_json::json!({"pageNo": 2, "pageLength": 25, "search": null});
    Mock::given(method("POST"))
        .and(path("/api/admin/leaves/request-list"))
        .and(header("Authorization", "Bearer revoked"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/leaves/request-list"))
        .and(header("Authorization", "Bearer renewed"))
        .and(body_json(expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "data": [],
            "totalRecords": 0
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_envelope("renewed")))
        .mount(&server)
        .await;

    let harness = signed_in(&server, "revoked", 60);
    let page = harness
        .client
        .fetch_leave_requests(&DataTableArg::page(2, 25))
        .await
        .unwrap();
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_denial_with_failed_refresh_ends_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/holidays/list"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rejection("Invalid refresh token")))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_in(&server, "revoked", 60);
    let mut events = harness.client.subscribe();

    let result = harness.client.fetch_holidays().await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert!(!harness.session().is_authenticated());
    assert_eq!(harness.session().access_token(), None);
    assert!(harness.storage_is_empty());
    assert!(matches!(
        events.try_recv(),
        Ok(AuthEvent::LoginRequired { .. })
    ));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_concurrent_failures_notify_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string("refresh token expired")
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/holidays/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(holidays_json()))
        .expect(0)
        .mount(&server)
        .await;

    let harness = signed_in(&server, "expiring", 1);
    let mut events = harness.client.subscribe();

    let results = join_all((0..3).map(|_| harness.client.fetch_holidays())).await;

    for result in &results {
        assert!(matches!(
            result,
            Err(ApiError::Refresh(RefreshError::Rejected(_)))
        ));
    }
    assert!(harness.storage_is_empty());
    assert!(matches!(
        events.try_recv(),
        Ok(AuthEvent::LoginRequired { .. })
    ));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

/// Mount a 401 for `route` that answers after `delay`.
async fn deny_after(server: &MockServer, route: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("Authorization", "Bearer revoked"))
        .respond_with(ResponseTemplate::new(401).set_delay(delay))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_late_denial_after_failed_refresh_notifies_once() {
    let server = MockServer::start().await;
    deny_after(&server, "/api/admin/holidays/list", Duration::ZERO).await;
    deny_after(&server, "/api/admin/employees/get-roles", Duration::from_millis(300)).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rejection("Invalid refresh token")))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_in(&server, "revoked", 60);
    let mut events = harness.client.subscribe();

    let (holidays, roles) = tokio::join!(
        harness.client.fetch_holidays(),
        harness.client.fetch_roles()
    );

    assert!(matches!(holidays, Err(ApiError::Unauthorized)));
    assert!(matches!(roles, Err(ApiError::Unauthorized)));
    assert_eq!(harness.client.coordinator().refresh_calls(), 1);
    assert!(harness.storage_is_empty());
    assert!(matches!(
        events.try_recv(),
        Ok(AuthEvent::LoginRequired { .. })
    ));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_late_denial_after_refresh_replays_with_new_token() {
    let server = MockServer::start().await;
    deny_after(&server, "/api/admin/holidays/list", Duration::ZERO).await;
    deny_after(&server, "/api/admin/employees/get-roles", Duration::from_millis(300)).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/holidays/list"))
        .and(header("Authorization", "Bearer renewed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(holidays_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/employees/get-roles"))
        .and(header("Authorization", "Bearer renewed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            { "id": 1, "roleName": "Admin" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_envelope("renewed")))
        .expect(1)
        .mount(&server)
        .await;

    let harness = signed_in(&server, "revoked", 60);
    let (holidays, roles) = tokio::join!(
        harness.client.fetch_holidays(),
        harness.client.fetch_roles()
    );

    assert_eq!(holidays.unwrap().len(), 2);
    assert_eq!(roles.unwrap()[0].role_name, "Admin");
    assert_eq!(harness.client.coordinator().refresh_calls(), 1);
    assert_eq!(harness.session().access_token().as_deref(), Some("renewed"));
}

#[tokio::test]
async fn test_refresh_server_error_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let harness = signed_in(&server, "expiring", 1);
    let result = harness.client.refresh_session().await;

    assert!(matches!(result, Err(RefreshError::Transport(_))));
    assert!(!harness.session().is_authenticated());
}

#[tokio::test]
async fn test_refresh_without_refresh_token_skips_network() {
    let server = MockServer::start().await;
    let harness = harness(&server);

    let result = harness.client.refresh_session().await;

    assert_eq!(result, Err(RefreshError::NoRefreshToken));
    assert!(server.received_requests().await.unwrap().is_empty());
}
