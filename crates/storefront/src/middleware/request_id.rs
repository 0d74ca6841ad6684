//! Request correlation ids.
//!
//! Every response carries an `x-request-id`. An id supplied by a proxy in
//! front of the storefront is kept if it looks like an id; anything else
//! (oversized, control characters, spaces) is replaced by a fresh UUID v4 so
//! it cannot smuggle text into logs or Sentry tags.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id that is passed through.
const MAX_REQUEST_ID_LEN: usize = 64;

/// The id assigned to the current request, available as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Assign a request id, record it on the span and in the Sentry scope, and
/// echo it in the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(accept_upstream_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &id));
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Keep an upstream id only if it is short and made of id-like characters.
fn accept_upstream_id(raw: &str) -> Option<String> {
    let well_formed = !raw.is_empty()
        && raw.len() <= MAX_REQUEST_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    well_formed.then(|| raw.to_string())
}
