//! Authentication service.
//!
//! Login and signup go to the backend's auth service first. When it fails,
//! login is still recorded locally, and signup falls back to writing the
//! visitor's profile into the `users` table.
//!
//! Passwords only ever travel to the auth service. They are never written
//! to the `users` table or to the local store.

mod error;

pub use error::AuthError;

use secrecy::SecretString;
use tracing::{info, instrument, warn};

use shopfront_core::{Email, UserProfile};

use crate::backend::{AuthAction, BackendError, Filter, RestClient};
use crate::models::{BackendSession, session_keys};
use crate::storage::{Resource, Storage};

/// How a login was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The auth service accepted the credentials.
    Remote,
    /// The auth service failed; the login was recorded locally.
    LocalFallback,
    /// No backend; the login was recorded locally.
    Local,
}

impl LoginOutcome {
    /// Message shown to the visitor.
    #[must_use]
    pub fn message(self, email: &Email) -> String {
        match self {
            Self::Remote => format!("Welcome back, {email}!"),
            Self::LocalFallback => {
                format!("Login stored locally (backend unavailable). Welcome, {email}!")
            }
            Self::Local => "Login successful (local storage)!".to_string(),
        }
    }
}

/// How a signup was completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// The auth service created the account.
    Remote,
    /// The auth service failed; the profile row was saved instead.
    ProfileOnly,
}

impl SignupOutcome {
    /// Message shown to the visitor.
    #[must_use]
    pub fn message(self, email: &Email) -> String {
        match self {
            Self::Remote => format!("Signup successful! Welcome, {email}"),
            Self::ProfileOnly => {
                format!("Signup successful! User saved to database. Welcome, {email}!")
            }
        }
    }
}

/// Authentication operations for the current visitor.
pub struct AuthService<'a> {
    storage: &'a Storage,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Log in.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local store fails; auth service
    /// failures fall back to a local login.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<LoginOutcome, AuthError> {
        let local = self.storage.local();

        let outcome = match self.storage.remote() {
            Some(client) => match client.auth(AuthAction::SignIn, email.as_str(), password).await {
                Ok(session) => {
                    local
                        .set(session_keys::BACKEND_SESSION, &BackendSession(session))
                        .await?;
                    LoginOutcome::Remote
                }
                Err(e) => {
                    warn!(error = %e, "Auth sign-in failed, recording login locally");
                    LoginOutcome::LocalFallback
                }
            },
            None => LoginOutcome::Local,
        };

        local.set(session_keys::LOGGED_IN_USER, &email).await?;
        info!(?outcome, "Visitor logged in");
        Ok(outcome)
    }

    /// Sign up.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` without a backend
    /// - `ProfileRejected` (or a backend error) when the auth service and the
    ///   profile fallback both fail
    #[instrument(skip(self, password, name), fields(email = %email))]
    pub async fn signup(
        &self,
        email: &Email,
        password: &SecretString,
        name: Option<String>,
    ) -> Result<SignupOutcome, AuthError> {
        let Some(client) = self.storage.remote() else {
            return Err(AuthError::NotConfigured);
        };
        let local = self.storage.local();
        let profile = UserProfile::new(email.clone(), name);

        match client.auth(AuthAction::SignUp, email.as_str(), password).await {
            Ok(session) => {
                local
                    .set(session_keys::BACKEND_SESSION, &BackendSession(session))
                    .await?;
                local.set(session_keys::LOGGED_IN_USER, &email).await?;
                if let Err(e) = save_profile(client, &profile).await {
                    warn!(error = %e, "Profile row not saved after signup");
                }
                info!("Visitor signed up");
                Ok(SignupOutcome::Remote)
            }
            Err(e) => {
                warn!(error = %e, "Auth sign-up failed, saving profile row");
                save_profile(client, &profile).await?;
                local.set(session_keys::LOGGED_IN_USER, &email).await?;
                info!("Visitor signed up via profile row");
                Ok(SignupOutcome::ProfileOnly)
            }
        }
    }

    /// Forget the logged-in visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let local = self.storage.local();
        local.remove(session_keys::LOGGED_IN_USER).await?;
        local.remove(session_keys::BACKEND_SESSION).await?;
        Ok(())
    }

    /// Email of the logged-in visitor, if any.
    pub async fn current_user(&self) -> Option<Email> {
        self.storage
            .local()
            .get(session_keys::LOGGED_IN_USER)
            .await
            .ok()
            .flatten()
    }
}

/// Ensure a `users` row exists for `profile`.
///
/// Returns the stored row when the backend hands one back. An existing row
/// is reused; a conflicting insert is resolved by reading the row back.
///
/// # Errors
///
/// Returns `ProfileRejected` when the insert fails for any other reason.
#[instrument(skip(client, profile), fields(email = %profile.email))]
pub async fn save_profile(
    client: &RestClient,
    profile: &UserProfile,
) -> Result<Option<UserProfile>, AuthError> {
    let by_email = Filter::new().eq("email", &profile.email);
    let users = Resource::Users.table();

    match client.select::<UserProfile>(users, &by_email).await {
        Ok(rows) => {
            if let Some(existing) = rows.into_iter().next() {
                info!("Profile already exists");
                return Ok(Some(existing));
            }
        }
        Err(e) => warn!(error = %e, "Could not verify existing profile"),
    }

    match client.insert_returning::<_, UserProfile>(users, profile).await {
        Ok(row) => Ok(row),
        Err(BackendError::Parse(e)) => {
            warn!(error = %e, "Profile insert returned no readable row");
            Ok(None)
        }
        Err(BackendError::Status { status: 400, .. }) => {
            warn!(status = 400, "Profile insert returned an empty-body error");
            Ok(None)
        }
        Err(BackendError::Status { status: 409, body }) => {
            let rows = client
                .select::<UserProfile>(users, &by_email)
                .await
                .unwrap_or_default();
            rows.into_iter()
                .next()
                .map(Some)
                .ok_or(AuthError::ProfileRejected { status: 409, body })
        }
        Err(BackendError::Status { status, body }) => {
            Err(AuthError::ProfileRejected { status, body })
        }
        Err(e) => Err(e.into()),
    }
}
