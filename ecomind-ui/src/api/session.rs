//! Session endpoints and cookie handling
//!
//! The session id travels in the `ecomind_session` cookie. Every scored
//! response re-sends the cookie so a replaced (expired or unknown) session
//! id is picked up by the browser.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;

pub const SESSION_COOKIE: &str = "ecomind_session";

/// Session id from the request's `Cookie` headers, if present and valid
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value binding the browser to session `id`
pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

/// `Set-Cookie` value clearing the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE)
}

/// GET /api/session
///
/// Current score, progress and tip of the day. Starts a session (and picks
/// its tip) on first visit.
pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let (id, snapshot) = state
        .sessions
        .with_session(session_id_from_headers(&headers), |ctx| ctx.snapshot())
        .await;

    ([(header::SET_COOKIE, session_cookie(id))], Json(snapshot))
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub ended: bool,
}

/// DELETE /api/session
///
/// Discards the session state and clears the cookie.
pub async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let ended = match session_id_from_headers(&headers) {
        Some(id) => state.sessions.end(id).await,
        None => false,
    };

    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Json(EndSessionResponse { ended }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_parsing() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}; other=1", SESSION_COOKIE, id)).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_cookie_parsing_rejects_garbage() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("ecomind_session=not-a-uuid"),
        );
        assert_eq!(session_id_from_headers(&headers), None);
    }

    #[test]
    fn test_cookie_round_trip() {
        let id = Uuid::new_v4();
        let set_cookie = session_cookie(id);
        let pair = set_cookie.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(pair).unwrap());
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }
}
