//! Session store: the single source of truth for the signed-in session.
//!
//! The session lives in durable storage as four independent entries (access
//! token, refresh token, user profile, expiry). Writes of the four are not
//! atomic, so anything short of a complete, parseable set is treated as "no
//! session" when restoring.
//!
//! Every `store` and `clear` bumps a generation counter. A refresh that began
//! under an older generation can only commit through `store_if_generation`,
//! so a refresh that settles after logout cannot bring the session back.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use super::storage::{
    SessionStorage, ACCESS_TOKEN_KEY, EXPIRES_AT_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY,
};
use crate::models::{EmployeeInfo, LoginResponse};

/// Default buffer before expiry at which a token counts as near expiry.
pub const DEFAULT_REFRESH_THRESHOLD_MINUTES: i64 = 5;

/// A complete session as returned by login or refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry exactly as the backend sent it
    pub expires_at: String,
    pub user: EmployeeInfo,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response.expires_at,
            user: response.employee,
        }
    }
}

#[derive(Debug, Default)]
struct Identity {
    user: Option<EmployeeInfo>,
    authenticated: bool,
    generation: u64,
}

pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    threshold: Duration,
    identity: Mutex<Identity>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn SessionStorage>, threshold: Duration) -> Self {
        Self {
            storage,
            threshold,
            identity: Mutex::new(Identity::default()),
        }
    }

    pub fn with_default_threshold(storage: Box<dyn SessionStorage>) -> Self {
        Self::new(storage, Duration::minutes(DEFAULT_REFRESH_THRESHOLD_MINUTES))
    }

    fn lock(&self) -> MutexGuard<'_, Identity> {
        self.identity.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read one entry; storage failures count as a missing entry.
    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read session entry");
                None
            }
        }
    }

    /// Get the bearer token to attach, if any
    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Stored expiry, if present and parseable
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.read(EXPIRES_AT_KEY).and_then(|s| parse_expiry(&s))
    }

    /// True when the token expires within the threshold, or when no usable
    /// expiry is stored.
    pub fn is_near_expiry(&self) -> bool {
        self.is_near_expiry_at(Utc::now())
    }

    pub fn is_near_expiry_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at - now < self.threshold,
            None => true,
        }
    }

    pub fn current_user(&self) -> Option<EmployeeInfo> {
        self.lock().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Persist a verified login/refresh result.
    pub fn store(&self, session: &Session) -> Result<()> {
        let mut identity = self.lock();
        self.write_locked(&mut identity, session)
    }

    /// Persist only if nothing stored or cleared the session since
    /// `generation` was read. Returns whether the session was written.
    pub fn store_if_generation(&self, session: &Session, generation: u64) -> Result<bool> {
        let mut identity = self.lock();
        if identity.generation != generation {
            debug!(
                expected = generation,
                current = identity.generation,
                "Discarding session from a superseded refresh"
            );
            return Ok(false);
        }
        self.write_locked(&mut identity, session)?;
        Ok(true)
    }

    fn write_locked(&self, identity: &mut Identity, session: &Session) -> Result<()> {
        let user_json =
            serde_json::to_string(&session.user).context("Failed to serialize user profile")?;

        // Any write counts as a new generation, even a partial one.
        identity.generation += 1;
        identity.user = None;
        identity.authenticated = false;

        self.storage.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        self.storage.set(USER_KEY, &user_json)?;
        self.storage.set(EXPIRES_AT_KEY, &session.expires_at)?;

        if parse_expiry(&session.expires_at).is_none() {
            warn!(expires_at = %session.expires_at, "Stored session has an unparseable expiry");
        }

        identity.user = Some(session.user.clone());
        identity.authenticated = true;
        debug!(employee_id = session.user.employee_id, "Session stored");
        Ok(())
    }

    /// Replace the stored profile, leaving the tokens alone.
    pub fn update_user(&self, user: &EmployeeInfo) -> Result<()> {
        let mut identity = self.lock();
        let user_json = serde_json::to_string(user).context("Failed to serialize user profile")?;
        self.storage.set(USER_KEY, &user_json)?;
        identity.user = Some(user.clone());
        Ok(())
    }

    /// Remove every session entry and reset identity. Idempotent; storage
    /// failures are logged and do not stop the in-memory reset.
    pub fn clear(&self) {
        let mut identity = self.lock();
        self.clear_locked(&mut identity);
    }

    /// Clear only if the session is still the one `generation` refers to.
    pub fn clear_if_generation(&self, generation: u64) -> bool {
        let mut identity = self.lock();
        if identity.generation != generation {
            return false;
        }
        self.clear_locked(&mut identity);
        true
    }

    fn clear_locked(&self, identity: &mut Identity) {
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove session entry");
            }
        }
        identity.generation += 1;
        identity.user = None;
        identity.authenticated = false;
        debug!("Session cleared");
    }

    /// Rehydrate from storage at startup. Returns whether the restored session
    /// is authenticated (token present and not yet expired).
    ///
    /// An expired session is kept so the next request can try a refresh; a
    /// partial or unparseable one is cleared.
    pub fn restore(&self) -> bool {
        let mut identity = self.lock();

        let Some(user_json) = self.read(USER_KEY) else {
            debug!("No stored user, nothing to restore");
            self.clear_locked(&mut identity);
            return false;
        };

        let user: EmployeeInfo = match serde_json::from_str(&user_json) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Failed to parse stored user data");
                self.clear_locked(&mut identity);
                return false;
            }
        };

        let access_token = self.read(ACCESS_TOKEN_KEY);
        let refresh_token = self.read(REFRESH_TOKEN_KEY);
        let expires_at = self.read(EXPIRES_AT_KEY).and_then(|s| parse_expiry(&s));

        let (Some(_), Some(_), Some(expires_at)) = (access_token, refresh_token, expires_at) else {
            warn!("Stored session is incomplete, clearing it");
            self.clear_locked(&mut identity);
            return false;
        };

        let authenticated = Utc::now() < expires_at;
        identity.user = Some(user);
        identity.authenticated = authenticated;

        if authenticated {
            info!(%expires_at, "Restored session");
        } else {
            info!(%expires_at, "Restored expired session, will refresh on next request");
        }
        authenticated
    }
}

/// Parse the backend's expiry. Offset-less timestamps are read as UTC.
pub fn parse_expiry(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}
