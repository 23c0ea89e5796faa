//! REST client for the hosted backend.
//!
//! Thin wrapper over `reqwest` that adds the backend's auth headers, builds
//! table URLs with filters, and turns non-success statuses into
//! [`BackendError::Status`] carrying the response body.

use std::fmt::Display;
use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::BackendError;

/// Ask the backend to echo inserted rows back.
const PREFER_REPRESENTATION: &str = "return=representation";

/// Longest body excerpt written to logs.
const LOG_BODY_CHARS: usize = 500;

/// Query-string filter for a table request.
///
/// ```rust,ignore
/// let filter = Filter::new().select("*").eq("id", 42);
/// // -> ?select=*&id=eq.42
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pairs: Vec<(String, String)>,
}

impl Filter {
    /// An empty filter (all rows, all columns).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the returned columns.
    #[must_use]
    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns)
    }

    /// Match rows where `column` equals `value`.
    #[must_use]
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("eq.{value}"))
    }

    /// Match rows where `column` is one of `values`.
    #[must_use]
    pub fn in_list<T: Display>(self, column: &str, values: &[T]) -> Self {
        let list = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.param(column, format!("in.({list})"))
    }

    /// Add a raw query parameter.
    #[must_use]
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.pairs.push((key.to_owned(), value.into()));
        self
    }

    /// Whether no parameters were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Auth service operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    /// Password sign-in (`/auth/v1/token?grant_type=password`).
    SignIn,
    /// Account creation (`/auth/v1/signup`).
    SignUp,
}

/// Client for the backend's REST and auth endpoints.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
}

impl RestClient {
    /// Create a client for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: Url, anon_key: SecretString) -> Self {
        Self {
            inner: Arc::new(RestClientInner {
                client: reqwest::Client::new(),
                base_url,
                anon_key,
            }),
        }
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str, filter: &Filter) -> Result<Url, BackendError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}"))?;
        if !filter.is_empty() {
            url.query_pairs_mut().extend_pairs(filter.pairs.iter());
        }
        Ok(url)
    }

    fn table_url(&self, table: &str, filter: &Filter) -> Result<Url, BackendError> {
        self.endpoint(&format!("rest/v1/{table}"), filter)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let key = self.inner.anon_key.expose_secret();
        self.inner
            .client
            .request(method, url)
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .header(ACCEPT, "application/json")
    }

    /// Send a request and return the body text of a successful response.
    async fn send(request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %excerpt(&body),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// Read rows from a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend answers with a
    /// non-success status, or the body is not a JSON row set.
    #[instrument(skip(self, filter))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &Filter,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(table, filter)?;
        let body = Self::send(self.request(Method::GET, url)).await?;
        parse_rows(&body)
    }

    /// Insert a row, asking for the stored representation back.
    ///
    /// Returns the raw response body, which may be empty if the backend
    /// ignores the representation preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not a success.
    #[instrument(skip(self, row))]
    pub async fn insert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<String, BackendError> {
        let url = self.table_url(table, &Filter::new())?;
        let request = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", PREFER_REPRESENTATION)
            .json(row);
        Self::send(request).await
    }

    /// Insert a row and decode the first returned row, if any.
    ///
    /// # Errors
    ///
    /// As [`RestClient::insert`], plus [`BackendError::Parse`] when the
    /// returned body is not a row set.
    pub async fn insert_returning<B, T>(&self, table: &str, row: &B) -> Result<Option<T>, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.insert(table, row).await?;
        first_row(&body)
    }

    /// Patch the rows matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not a success.
    #[instrument(skip(self, filter, patch))]
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        filter: &Filter,
        patch: &B,
    ) -> Result<(), BackendError> {
        let url = self.table_url(table, filter)?;
        let request = self
            .request(Method::PATCH, url)
            .header(CONTENT_TYPE, "application/json")
            .json(patch);
        Self::send(request).await.map(drop)
    }

    /// Delete the rows matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not a success.
    #[instrument(skip(self, filter))]
    pub async fn delete(&self, table: &str, filter: &Filter) -> Result<(), BackendError> {
        let url = self.table_url(table, filter)?;
        Self::send(self.request(Method::DELETE, url)).await.map(drop)
    }

    /// Call the auth service and return its JSON session payload.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Status`] when the service answers with something other
    ///   than JSON
    /// - [`BackendError::Auth`] with the service's message when it rejects the
    ///   credentials
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn auth(
        &self,
        action: AuthAction,
        email: &str,
        password: &SecretString,
    ) -> Result<serde_json::Value, BackendError> {
        let url = match action {
            AuthAction::SignIn => {
                self.endpoint("auth/v1/token", &Filter::new().param("grant_type", "password"))?
            }
            AuthAction::SignUp => self.endpoint("auth/v1/signup", &Filter::new())?,
        };
        debug!(%url, "Calling auth service");

        let response = self
            .inner
            .client
            .post(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({
                "email": email,
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        let body = response.text().await?;

        if !is_json {
            tracing::error!(status = %status, body = %excerpt(&body), "Non-JSON response from auth service");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data: serde_json::Value = serde_json::from_str(&body)?;
        if !status.is_success() {
            return Err(BackendError::Auth(auth_error_message(&data)));
        }
        Ok(data)
    }
}

/// Pick the most specific message out of an auth error payload.
fn auth_error_message(data: &serde_json::Value) -> String {
    ["message", "error_description", "msg", "error"]
        .iter()
        .find_map(|key| data.get(key).and_then(serde_json::Value::as_str))
        .map_or_else(|| data.to_string(), str::to_owned)
}

/// Decode a row set. An empty body is an empty set; a lone object is a set of one.
///
/// # Errors
///
/// Returns [`BackendError::Parse`] if the body is not JSON rows of type `T`.
pub fn parse_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, BackendError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<serde_json::Value>(body)? {
        serde_json::Value::Array(rows) => rows
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(BackendError::from))
            .collect(),
        row => Ok(vec![serde_json::from_value(row)?]),
    }
}

/// Decode the first row of a row set, if any.
///
/// # Errors
///
/// Returns [`BackendError::Parse`] if the body is not JSON rows of type `T`.
pub fn first_row<T: DeserializeOwned>(body: &str) -> Result<Option<T>, BackendError> {
    Ok(parse_rows(body)?.into_iter().next())
}

fn excerpt(body: &str) -> String {
    body.chars().take(LOG_BODY_CHARS).collect()
}
