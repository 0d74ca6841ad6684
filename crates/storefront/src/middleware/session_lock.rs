//! Per-session serialization of cart mutations.
//!
//! A cart request loads the cart from the session, applies one event and
//! writes the session back after the handler returns. Two such requests from
//! the same visitor must not interleave, or one of them silently overwrites
//! the other. This layer sits outside the session layer and holds a lock
//! keyed by the session cookie for the whole request, including the final
//! session save.
//!
//! Safe methods (`GET`, `HEAD`) never write the cart and are not serialized.
//! Requests without a session cookie start a fresh session and cannot race
//! with anyone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Request, State},
    http::{Method, header::COOKIE},
    middleware::Next,
    response::Response,
};
use tower_sessions::cookie::Cookie;

use crate::middleware::session::SESSION_COOKIE_NAME;
use crate::state::AppState;

type Slot = Arc<tokio::sync::Mutex<()>>;

/// Locks for sessions that currently have a mutating request in flight.
#[derive(Debug, Default)]
pub struct SessionLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

impl SessionLocks {
    /// Number of sessions with a request in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// Drop the slot once the last request holding it is done.
    fn release(&self, key: &str, slot: Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        drop(slot);
        if slots.get(key).is_some_and(|s| Arc::strong_count(s) == 1) {
            slots.remove(key);
        }
    }
}

/// Run mutating requests of one session one at a time.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if matches!(*request.method(), Method::GET | Method::HEAD) {
        return next.run(request).await;
    }
    let Some(session_key) = session_cookie(&request) else {
        return next.run(request).await;
    };

    let locks = state.session_locks();
    let slot = locks.slot(&session_key);
    let response = {
        let _guard = slot.lock().await;
        next.run(request).await
    };
    locks.release(&session_key, slot);

    response
}

/// The session cookie value, if the request carries one.
fn session_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request_with_cookie(cookie: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/cart/add")
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_session_cookie_found_among_others() {
        let request = request_with_cookie("theme=dark; tm_session=abc123; other=1");
        assert_eq!(session_cookie(&request).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_cookie_missing() {
        let request = request_with_cookie("theme=dark");
        assert!(session_cookie(&request).is_none());
    }

    #[test]
    fn test_slot_is_shared_and_released() {
        let locks = SessionLocks::default();
        let first = locks.slot("abc");
        let second = locks.slot("abc");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(locks.in_flight(), 1);

        locks.release("abc", first);
        assert_eq!(locks.in_flight(), 1);
        locks.release("abc", second);
        assert_eq!(locks.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_slot_serializes_holders() {
        let locks = SessionLocks::default();
        let slot = locks.slot("abc");
        let guard = slot.lock().await;
        assert!(locks.slot("abc").try_lock().is_err());
        drop(guard);
        assert!(locks.slot("abc").try_lock().is_ok());
    }
}
