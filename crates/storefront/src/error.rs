//! Handler error type and the Sentry context helpers used by the routes.
//!
//! Page handlers return [`Result`]; fragment handlers answer failures with
//! an alert themselves and only reach for `AppError` when nothing sensible
//! can be rendered.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shopfront_core::Email;
use thiserror::Error;

use crate::backend::BackendError;
use crate::filters;
use crate::services::{CatalogError, CheckoutError};
use crate::storage::StorageError;

/// Why a page request could not be served.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Status for the response, plus the public message when the real one
    /// must stay server-side.
    const fn disposition(&self) -> (StatusCode, Option<&'static str>) {
        match self {
            Self::Backend(_) => (StatusCode::BAD_GATEWAY, Some("External service error")),
            Self::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("Internal server error"),
            ),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, None),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::NotFound(format!("product {id}")),
            CatalogError::NotConfigured => Self::NotFound("catalog".to_string()),
            CatalogError::Backend(e) => Self::Backend(e),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Storage(e) => Self::Storage(e),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "errors/not_found.html")]
pub struct NotFoundTemplate {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, public_message) = self.disposition();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request error");
        }

        match (self, public_message) {
            (err @ Self::NotFound(_), _) => {
                tracing::debug!(error = %err, "Not found");
                let page = NotFoundTemplate {
                    message: err.to_string(),
                };
                (status, page).into_response()
            }
            (_, Some(message)) => (status, message).into_response(),
            (err, None) => (status, err.to_string()).into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Tag subsequent Sentry events with the signed-in visitor.
pub fn identify_visitor(email: &Email) {
    let user = sentry::User {
        id: Some(email.to_string()),
        email: Some(email.to_string()),
        ..Default::default()
    };
    sentry::configure_scope(|scope| scope.set_user(Some(user)));
}

/// Stop tagging Sentry events after logout.
pub fn forget_visitor() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

/// Record a storefront action on the Sentry breadcrumb trail.
pub fn breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let data = data
        .iter()
        .map(|(k, v)| ((*k).to_owned(), serde_json::Value::from(*v)))
        .collect();

    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        data,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_of(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::BadRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Backend(BackendError::Status {
                status: 500,
                body: String::new(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_backend_details_stay_private() {
        let err = AppError::Backend(BackendError::Status {
            status: 503,
            body: "pg pool exhausted".to_string(),
        });
        assert_eq!(
            err.disposition(),
            (StatusCode::BAD_GATEWAY, Some("External service error"))
        );
    }

    #[test]
    fn test_catalog_not_found_maps_to_404() {
        let err = AppError::from(CatalogError::NotFound(shopfront_core::ProductId::new(9)));
        assert_eq!(err.to_string(), "Not found: product 9");
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unconfigured_catalog_maps_to_404() {
        assert_eq!(
            status_of(AppError::from(CatalogError::NotConfigured)),
            StatusCode::NOT_FOUND
        );
    }
}
