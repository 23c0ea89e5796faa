//! Layers wrapped around the router by `build_app`, outermost first:
//! Sentry hub and capture, request id, the `TraceLayer` span that records
//! that id, hardening headers, then the session that holds the visitor's
//! local store.

pub mod request_id;
pub mod security_headers;
pub mod session;

pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
