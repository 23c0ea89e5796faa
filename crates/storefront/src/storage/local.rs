//! Per-visitor local store backed by the session.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde::{Serialize, de::DeserializeOwned};
use tower_sessions::Session;

use super::StorageError;

/// The visitor's persistent key-value store.
///
/// Values are JSON documents under string keys, kept in the visitor's
/// session for as long as the session lives.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    session: Session,
}

impl LocalStorage {
    /// Wrap a session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Read and decode the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails or the stored value does
    /// not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        Ok(self.session.get(key).await?)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or the session
    /// store fails.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        Ok(self.session.insert(key, value).await?)
    }

    /// Remove the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.session.remove_value(key).await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for LocalStorage
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self::new)
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Session layer missing for local storage",
            ))
    }
}
