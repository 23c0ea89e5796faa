//! Session-stored models.

pub mod session;

pub use session::{BackendSession, keys as session_keys};
