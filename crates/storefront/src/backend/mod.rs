//! Hosted backend: REST table endpoints and the auth service.
//!
//! # Architecture
//!
//! - The backend exposes one REST resource per table under `/rest/v1/{table}`
//!   with query-string filtering (`id=eq.5`, `id=in.(1,2)`), and an auth
//!   service under `/auth/v1/`.
//! - Every request carries the anon key both as `apikey` and as a bearer token.
//! - Whether the backend is used at all is decided once, from configuration:
//!   [`Backend::Remote`] or [`Backend::Local`]. Callers match on it, so the
//!   local fallback branch cannot be forgotten.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::backend::{Backend, Filter};
//!
//! let backend = Backend::from_config(&config.backend);
//! if let Backend::Remote(client) = &backend {
//!     let rows: Vec<Product> = client
//!         .select("products", &Filter::new().select("*"))
//!         .await?;
//! }
//! ```

mod cache;
mod rest;

pub use cache::{CacheKey, CacheValue};
pub use rest::{AuthAction, Filter, RestClient};

use thiserror::Error;

use crate::config::BackendConfig;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure (connection refused, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend request failed {status}: {body}")]
    Status { status: u16, body: String },

    /// The auth service rejected the request.
    #[error("{0}")]
    Auth(String),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built from the configured base URL.
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// HTTP status code, for errors that carry one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Where persistent state lives for this deployment.
#[derive(Clone)]
pub enum Backend {
    /// Backend configured: REST tables are the source of truth.
    Remote(RestClient),
    /// Backend unconfigured: only the visitor's local store is used.
    Local,
}

impl Backend {
    /// Select the backend from configuration.
    #[must_use]
    pub fn from_config(config: &BackendConfig) -> Self {
        match config {
            BackendConfig::Configured { url, anon_key } => {
                Self::Remote(RestClient::new(url.clone(), anon_key.clone()))
            }
            BackendConfig::Unconfigured => Self::Local,
        }
    }

    /// Whether a remote backend is configured.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(client) => f.debug_tuple("Remote").field(&client.base_url()).finish(),
            Self::Local => f.write_str("Local"),
        }
    }
}
