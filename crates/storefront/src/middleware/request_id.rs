//! Request IDs for log and error correlation.
//!
//! An upstream `x-request-id` is reused when present, otherwise a UUID v4 is
//! minted. The id is stored in the request extensions (so the trace span can
//! pick it up), tagged on the Sentry scope and echoed on the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID stored in the request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Reuse the upstream header value, or mint a fresh id.
    #[must_use]
    pub fn from_request(request: &Request) -> Self {
        let id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), String::from);
        Self(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attach a [`RequestId`] to the request and echo it on the response.
///
/// Must run outside the trace layer so the span can read it.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_request(&request);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id.0);
    });
    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.0) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn test_upstream_id_is_reused() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "edge-42")
            .body(Body::empty())
            .unwrap();
        assert_eq!(RequestId::from_request(&request).0, "edge-42");
    }

    #[test]
    fn test_missing_id_is_generated() {
        let request = Request::builder().body(Body::empty()).unwrap();
        let id = RequestId::from_request(&request);
        assert!(Uuid::parse_str(&id.0).is_ok());
    }
}
