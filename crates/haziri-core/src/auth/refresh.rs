//! Single-flight token refresh.
//!
//! `RefreshCoordinator` is either idle or refreshing. The first caller that
//! needs a new token becomes the leader and performs the one refresh call;
//! every caller that arrives while it is in flight waits on a oneshot channel
//! and receives the same outcome once the call settles.
//!
//! On success the new session is stored and every waiter gets the new access
//! token. On failure the session is cleared, every waiter gets the error, and
//! a single `AuthEvent::LoginRequired` is published.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use super::session::{Session, SessionStore};
use crate::models::{LoginResponse, RefreshTokenRequest};

/// Buffer size for the auth event channel.
/// Events are rare (one per refresh episode); 16 leaves room for slow readers.
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("no refresh token is stored")]
    NoRefreshToken,

    #[error("refresh rejected: {0}")]
    Rejected(String),

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("could not persist refreshed session: {0}")]
    Storage(String),

    #[error("session ended while the refresh was in flight")]
    Superseded,

    #[error("refresh was interrupted before it settled")]
    Interrupted,
}

/// Session lifecycle notifications for the console front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SessionRefreshed,
    /// The session is gone; the user must sign in again.
    LoginRequired { reason: String },
}

type Outcome = Result<String, RefreshError>;

enum State {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<Outcome>>,
    },
}

pub struct RefreshCoordinator {
    session: Arc<SessionStore>,
    state: Mutex<State>,
    events: broadcast::Sender<AuthEvent>,
    refresh_calls: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(session: Arc<SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session,
            state: Mutex::new(State::Idle),
            events,
            refresh_calls: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), State::Refreshing { .. })
    }

    /// Number of refresh calls started so far.
    pub fn refresh_calls(&self) -> u64 {
        self.refresh_calls.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Obtain a fresh access token.
    ///
    /// `perform` makes the network call; it only runs when this caller leads
    /// the episode. Callers that join an in-flight refresh drop it unused.
    pub async fn refresh<F, Fut>(&self, perform: F) -> Outcome
    where
        F: FnOnce(RefreshTokenRequest) -> Fut,
        Fut: Future<Output = Result<LoginResponse, RefreshError>>,
    {
        let waiter = {
            let mut state = self.lock();
            match &mut *state {
                State::Refreshing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                State::Idle => {
                    *state = State::Refreshing {
                        waiters: Vec::new(),
                    };
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            debug!("Joining in-flight token refresh");
            return rx.await.unwrap_or(Err(RefreshError::Interrupted));
        }

        let mut episode = Episode {
            coordinator: self,
            settled: false,
        };
        let outcome = self.lead(perform).await;
        episode.settle(outcome.clone());
        outcome
    }

    async fn lead<F, Fut>(&self, perform: F) -> Outcome
    where
        F: FnOnce(RefreshTokenRequest) -> Fut,
        Fut: Future<Output = Result<LoginResponse, RefreshError>>,
    {
        let generation = self.session.generation();

        let Some(refresh_token) = self.session.refresh_token() else {
            return self.fail(generation, RefreshError::NoRefreshToken);
        };
        let request = RefreshTokenRequest {
            access_token: self.session.access_token().unwrap_or_default(),
            refresh_token,
        };

        let call = self.refresh_calls.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(call, generation, "Refreshing access token");

        let response = match perform(request).await {
            Ok(response) => response,
            Err(e) => return self.fail(generation, e),
        };

        let session = Session::from(response);
        match self.session.store_if_generation(&session, generation) {
            Ok(true) => {
                info!(expires_at = %session.expires_at, "Access token refreshed");
                let _ = self.events.send(AuthEvent::SessionRefreshed);
                Ok(session.access_token)
            }
            Ok(false) => {
                info!("Session ended during refresh, discarding new token");
                Err(RefreshError::Superseded)
            }
            Err(e) => {
                warn!(error = %e, "Failed to store refreshed session");
                // The partial write already moved the generation on.
                self.session.clear();
                self.login_required(format!("could not persist refreshed session: {}", e));
                Err(RefreshError::Storage(e.to_string()))
            }
        }
    }

    fn fail(&self, generation: u64, error: RefreshError) -> Outcome {
        if !self.session.clear_if_generation(generation) {
            info!(error = %error, "Refresh failed after the session already ended");
            return Err(RefreshError::Superseded);
        }
        warn!(error = %error, "Token refresh failed, session cleared");
        self.login_required(error.to_string());
        Err(error)
    }

    fn login_required(&self, reason: String) {
        let _ = self.events.send(AuthEvent::LoginRequired { reason });
    }

    /// Back to idle, handing `outcome` to everyone who queued up.
    fn release(&self, outcome: Outcome) {
        let waiters = match std::mem::replace(&mut *self.lock(), State::Idle) {
            State::Refreshing { waiters } => waiters,
            State::Idle => Vec::new(),
        };
        if !waiters.is_empty() {
            debug!(waiters = waiters.len(), ok = outcome.is_ok(), "Releasing refresh waiters");
        }
        for waiter in waiters {
            // A waiter whose caller went away is fine to skip.
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Releases waiters even if the leading future is dropped mid-refresh.
struct Episode<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl Episode<'_> {
    fn settle(&mut self, outcome: Outcome) {
        self.settled = true;
        self.coordinator.release(outcome);
    }
}

impl Drop for Episode<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Token refresh dropped before settling");
            self.coordinator.release(Err(RefreshError::Interrupted));
        }
    }
}
