//! Admin session management
//!
//! In-memory bearer-token sessions with fixed expiry and a periodic sweep.

mod store;
mod types;

pub use store::{DEFAULT_SESSION_TTL_HOURS, DEFAULT_SWEEP_INTERVAL, SessionStore};
pub use types::Session;
