//! Storage adapter: one access path over the backend tables and the
//! visitor's local store.
//!
//! Reads go to the backend when it is configured and degrade to the local
//! rows when it fails. Writes are left to the callers, which know whether a
//! failure should be surfaced (cart, orders) or only logged (addresses).

mod local;

pub use local::LocalStorage;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::warn;

use crate::backend::{Backend, BackendError, Filter, RestClient};
use crate::models::session_keys;
use crate::state::AppState;

/// Errors from either side of the storage adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The session store failed or held undecodable data.
    #[error("local storage error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// A named collection, both a backend table and (for some) a local key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Products,
    Cart,
    Addresses,
    Orders,
    Users,
}

impl Resource {
    /// Backend table name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Cart => "cart",
            Self::Addresses => "addresses",
            Self::Orders => "orders",
            Self::Users => "users",
        }
    }

    /// Local store key, for resources mirrored locally.
    #[must_use]
    pub const fn local_key(self) -> Option<&'static str> {
        match self {
            Self::Cart => Some(session_keys::CART),
            Self::Addresses => Some(session_keys::ADDRESSES),
            Self::Orders => Some(session_keys::ORDERS),
            Self::Products | Self::Users => None,
        }
    }
}

/// The backend paired with the current visitor's local store.
#[derive(Debug, Clone)]
pub struct Storage {
    backend: Backend,
    local: LocalStorage,
}

impl Storage {
    #[must_use]
    pub const fn new(backend: Backend, local: LocalStorage) -> Self {
        Self { backend, local }
    }

    /// The REST client, when a backend is configured.
    #[must_use]
    pub const fn remote(&self) -> Option<&RestClient> {
        match &self.backend {
            Backend::Remote(client) => Some(client),
            Backend::Local => None,
        }
    }

    /// The visitor's local store.
    #[must_use]
    pub const fn local(&self) -> &LocalStorage {
        &self.local
    }

    /// Read rows of `resource`.
    ///
    /// Remote failures are logged and answered with the local rows; a local
    /// failure yields no rows.
    pub async fn read<T: DeserializeOwned>(&self, resource: Resource, filter: &Filter) -> Vec<T> {
        if let Backend::Remote(client) = &self.backend {
            match client.select(resource.table(), filter).await {
                Ok(rows) => return rows,
                Err(e) => {
                    warn!(table = resource.table(), error = %e, "Backend read failed, using local rows");
                }
            }
        }

        self.local_rows(resource).await.unwrap_or_else(|e| {
            warn!(table = resource.table(), error = %e, "Local rows unreadable");
            Vec::new()
        })
    }

    /// Rows stored locally for `resource` (empty when none or not mirrored).
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails or holds rows of another
    /// shape.
    pub async fn local_rows<T: DeserializeOwned>(
        &self,
        resource: Resource,
    ) -> Result<Vec<T>, StorageError> {
        let Some(key) = resource.local_key() else {
            return Ok(Vec::new());
        };
        Ok(self.local.get(key).await?.unwrap_or_default())
    }

    /// Replace the locally stored rows for `resource`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn set_local_rows<T: Serialize + Sync>(
        &self,
        resource: Resource,
        rows: &[T],
    ) -> Result<(), StorageError> {
        match resource.local_key() {
            Some(key) => self.local.set(key, &rows).await,
            None => Ok(()),
        }
    }

    /// Drop the locally stored rows for `resource`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn clear_local(&self, resource: Resource) -> Result<(), StorageError> {
        match resource.local_key() {
            Some(key) => self.local.remove(key).await,
            None => Ok(()),
        }
    }
}

impl FromRequestParts<AppState> for Storage {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let local = LocalStorage::from_request_parts(parts, state).await?;
        Ok(Self::new(state.backend().clone(), local))
    }
}
