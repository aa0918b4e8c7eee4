//! Session persistence and token refresh.
//!
//! - `storage`: durable key/value backends (files, OS keychain, memory)
//! - `session`: the `SessionStore`, the single source of truth for the tokens
//!   and the signed-in user
//! - `refresh`: the `RefreshCoordinator`, which collapses concurrent refresh
//!   attempts into one network call

pub mod refresh;
pub mod session;
pub mod storage;

pub use refresh::{AuthEvent, RefreshCoordinator, RefreshError};
pub use session::{parse_expiry, Session, SessionStore, DEFAULT_REFRESH_THRESHOLD_MINUTES};
pub use storage::{
    open_storage, FileStorage, KeyringStorage, MemoryStorage, SessionStorage, SESSION_KEYS,
};
