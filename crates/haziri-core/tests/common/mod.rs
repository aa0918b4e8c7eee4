#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use wiremock::MockServer;

use haziri_core::auth::{MemoryStorage, SessionStorage, SESSION_KEYS};
use haziri_core::models::EmployeeInfo;
use haziri_core::{ApiClient, Config, Session, SessionStore};

pub const APP_TYPE: &str = "Haziri-Admin";

pub fn employee_json() -> Value {
    json!({
        "empoyeeId": 1006,
        "name": "Nooruddin Md Afsar",
        "email": "noor@example.com",
        "phone": "8797905664",
        "isActive": true,
        "designationId": 2,
        "designationName": "Software Engineer",
        "hasAttendance": true,
        "gender": null
    })
}

pub fn employee() -> EmployeeInfo {
    serde_json::from_value(employee_json()).unwrap()
}

/// A login/refresh envelope for `token`, valid for an hour.
pub fn login_envelope(token: &str) -> Value {
    json!({
        "success": true,
        "data": {
            "accessToken": token,
            "refreshToken": format!("{}-refresh", token),
            "expiresAt": (Utc::now() + Duration::hours(1)).to_rfc3339(),
            "employee": employee_json()
        },
        "message": "OK",
        "timestamp": Utc::now().to_rfc3339()
    })
}

pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data, "message": "" })
}

pub fn rejection(message: &str) -> Value {
    json!({
        "success": false,
        "data": null,
        "message": message,
        "error": { "errorMessage": message }
    })
}

pub fn holidays_json() -> Value {
    envelope(json!([
        { "id": 1, "holidayName": "Diwali", "holidayDate": "2025-10-20" },
        { "id": 2, "holidayName": "Christmas", "holidayDate": "2025-12-25T00:00:00" }
    ]))
}

pub struct Harness {
    pub client: ApiClient,
    pub storage: Arc<MemoryStorage>,
}

impl Harness {
    pub fn session(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    /// Whether no session entry is left in durable storage.
    pub fn storage_is_empty(&self) -> bool {
        SESSION_KEYS
            .iter()
            .all(|key| self.storage.get(key).unwrap().is_none())
    }
}

/// A client pointed at `server` with no session.
pub fn harness(server: &MockServer) -> Harness {
    let config = Config {
        api_url: format!("{}/api", server.uri()),
        ..Config::default()
    };
    let storage = Arc::new(MemoryStorage::new());
    let session = Arc::new(SessionStore::new(
        Box::new(storage.clone()),
        config.refresh_threshold(),
    ));
    let client = ApiClient::new(&config, session).unwrap();
    Harness { client, storage }
}

/// A client holding session `token` that expires in `minutes`.
pub fn signed_in(server: &MockServer, token: &str, minutes: i64) -> Harness {
    let harness = harness(server);
    harness
        .session()
        .store(&Session {
            access_token: token.to_string(),
            refresh_token: format!("{}-refresh", token),
            expires_at: (Utc::now() + Duration::minutes(minutes)).to_rfc3339(),
            user: employee(),
        })
        .unwrap();
    harness
}
