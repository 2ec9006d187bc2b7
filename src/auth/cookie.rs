//! Defines functions for setting and clearing the session cookie.

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use super::session_token::COOKIE_SESSION_TOKEN;

/// Add the session cookie to the cookie jar so that browser clients send
/// `session_token` on later requests.
///
/// The cookie is sent cross-site, so it must be secure.
pub(crate) fn set_session_cookie(
    jar: CookieJar,
    session_token: String,
    duration: Duration,
) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION_TOKEN, session_token))
            .path("/")
            .max_age(duration)
            .http_only(true)
            .same_site(SameSite::None)
            .secure(true),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete
/// the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: CookieJar) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION_TOKEN, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::None)
            .secure(true),
    )
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{CookieJar, cookie::SameSite};
    use time::{Duration, OffsetDateTime};

    use crate::auth::session_token::COOKIE_SESSION_TOKEN;

    use super::{invalidate_session_cookie, set_session_cookie};

    #[test]
    fn can_set_cookie() {
        let jar = set_session_cookie(CookieJar::new(), "abc".to_owned(), Duration::days(7));

        let cookie = jar.get(COOKIE_SESSION_TOKEN).unwrap();
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }

    #[test]
    fn invalidate_cookie_succeeds() {
        let jar = set_session_cookie(CookieJar::new(), "abc".to_owned(), Duration::days(7));

        let jar = invalidate_session_cookie(jar);
        let cookie = jar.get(COOKIE_SESSION_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }
}
