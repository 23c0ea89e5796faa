//! Authentication route handlers.
//!
//! The login/signup popup is a modal fragment loaded into `#modalRoot` from
//! the header user icon. Form posts answer with an alert fragment that lands
//! in `#authMessage`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, response::IntoResponse};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::Email;

use crate::error::{forget_visitor, identify_visitor};
use crate::filters;
use crate::routes::AlertTemplate;
use crate::services::AuthService;
use crate::storage::Storage;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template (popup inside the page chrome).
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<String>,
}

/// Login/signup popup fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/auth_popup.html")]
pub struct AuthPopupTemplate {
    pub user: Option<String>,
}

async fn current_user(storage: &Storage) -> Option<String> {
    AuthService::new(storage)
        .current_user()
        .await
        .map(Email::into_inner)
}

// =============================================================================
// Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(storage))]
pub async fn login_page(storage: Storage) -> impl IntoResponse {
    LoginTemplate {
        user: current_user(&storage).await,
    }
}

/// Popup fragment only, never the page chrome.
#[instrument(skip(storage))]
pub async fn popup(storage: Storage) -> impl IntoResponse {
    AuthPopupTemplate {
        user: current_user(&storage).await,
    }
}

/// Handle login form submission.
#[instrument(skip(storage, form), fields(email = %form.email))]
pub async fn login(storage: Storage, Form(form): Form<LoginForm>) -> impl IntoResponse {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return AlertTemplate::error(format!("Login failed: {e}")),
    };
    let password = SecretString::from(form.password);

    match AuthService::new(&storage).login(&email, &password).await {
        Ok(outcome) => {
            identify_visitor(&email);
            AlertTemplate::success(outcome.message(&email))
        }
        Err(e) => {
            tracing::error!(error = %e, "Login error");
            AlertTemplate::error(format!("Login failed: {e}"))
        }
    }
}

/// Handle signup form submission.
#[instrument(skip(storage, form), fields(email = %form.email))]
pub async fn signup(storage: Storage, Form(form): Form<SignupForm>) -> impl IntoResponse {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return AlertTemplate::error(format!("Signup failed: {e}")),
    };
    let password = SecretString::from(form.password);

    match AuthService::new(&storage)
        .signup(&email, &password, form.name)
        .await
    {
        Ok(outcome) => {
            identify_visitor(&email);
            AlertTemplate::success(outcome.message(&email))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Signup failed");
            AlertTemplate::error(format!("Signup failed: {e}"))
        }
    }
}

/// Handle logout.
#[instrument(skip(storage))]
pub async fn logout(storage: Storage) -> impl IntoResponse {
    match AuthService::new(&storage).logout().await {
        Ok(()) => {
            forget_visitor();
            AlertTemplate::success("Logged out.")
        }
        Err(e) => {
            tracing::error!(error = %e, "Logout error");
            AlertTemplate::error(format!("Logout failed: {e}"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_logged_out_shows_both_forms() {
        let html = AuthPopupTemplate { user: None }.render().unwrap();
        assert!(html.contains(r#"id="authPopup""#));
        assert!(html.contains(r#"id="loginForm""#));
        assert!(html.contains(r#"id="signupForm""#));
        assert!(!html.contains("<html"));
    }

    #[test]
    fn test_popup_logged_in_shows_logout() {
        let html = AuthPopupTemplate {
            user: Some("asha@example.com".to_string()),
        }
        .render()
        .unwrap();
        assert!(html.contains("asha@example.com"));
        assert!(html.contains("Welcome back, asha"));
        assert!(html.contains(r#"hx-post="/auth/logout""#));
        assert!(!html.contains(r#"id="signupForm""#));
    }

    #[test]
    fn test_login_page_embeds_popup() {
        let html = LoginTemplate { user: None }.render().unwrap();
        assert!(html.contains("<html"));
        assert!(html.contains(r#"id="authPopup""#));
    }
}
