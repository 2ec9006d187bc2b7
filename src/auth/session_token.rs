//! Finds the session token a client presents with a request.

use axum::http::HeaderMap;
use axum_extra::{
    extract::CookieJar,
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};

/// The name of the cookie holding the session token.
pub(crate) const COOKIE_SESSION_TOKEN: &str = "session_token";

/// Get the session token from the request headers.
///
/// The `session_token` cookie takes priority over an
/// `Authorization: Bearer <token>` header. Empty values count as absent.
pub(crate) fn get_session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);

    jar.get(COOKIE_SESSION_TOKEN)
        .map(|cookie| cookie.value_trimmed().to_owned())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .typed_get::<Authorization<Bearer>>()
                .map(|authorization| authorization.token().to_owned())
                .filter(|token| !token.is_empty())
        })
}
