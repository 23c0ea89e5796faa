//! Response hardening headers.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// Product images come from wherever the catalog rows point, so `img-src`
/// allows any HTTPS origin. htmx is served from unpkg.
const CSP: &str = "default-src 'none'; \
    script-src 'self' https://unpkg.com; \
    style-src 'self'; \
    font-src 'self'; \
    img-src 'self' https: data:; \
    connect-src 'self'; \
    frame-src 'none'; \
    object-src 'none'; \
    base-uri 'self'; \
    form-action 'self'; \
    frame-ancestors 'none'";

const PERMISSIONS_POLICY: &str =
    "camera=(), geolocation=(), microphone=(), payment=(), usb=(), interest-cohort=()";

/// Headers set on every response.
const ALWAYS: &[(&str, &str)] = &[
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "same-origin"),
    ("content-security-policy", CSP),
    ("permissions-policy", PERMISSIONS_POLICY),
    ("cross-origin-opener-policy", "same-origin"),
];

/// Pages and fragments carry the visitor's cart and login state, so only
/// `/static/` may be cached.
const NO_STORE: &str = "no-store, max-age=0";

fn apply(headers: &mut HeaderMap, cacheable: bool) {
    for &(name, value) in ALWAYS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    if !cacheable {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    }
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let cacheable = request.uri().path().starts_with("/static/");
    let mut response = next.run(request).await;
    apply(response.headers_mut(), cacheable);
    response
}
