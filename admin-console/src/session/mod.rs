//! Session layer: token storage, authentication state and the refresh protocol.

pub mod clock;
pub mod manager;
pub mod navigator;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use manager::{RefreshError, SessionManager, SessionState};
pub use navigator::{ConsoleNavigator, Navigator};
pub use store::{
    FileStore, KeyValueStore, MemoryStore, SessionStore, StoreError, ACCESS_TOKEN_KEY,
    CACHED_USER_KEY, REFRESH_TOKEN_KEY,
};
