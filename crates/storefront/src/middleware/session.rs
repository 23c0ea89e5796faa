//! Session layer backing each visitor's local store.
//!
//! Without a backend the session holds the visitor's cart, addresses,
//! orders and login, so the cookie outlives browser restarts and only
//! expires after a month without a visit.

use tower_sessions::{
    Expiry, MemoryStore, SessionManagerLayer,
    cookie::{SameSite, time::Duration},
};

use crate::config::StorefrontConfig;

pub const SESSION_COOKIE_NAME: &str = "shopfront_session";

const IDLE_EXPIRY: Duration = Duration::days(30);

#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(IDLE_EXPIRY))
        .with_secure(config.base_url.starts_with("https://"))
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
