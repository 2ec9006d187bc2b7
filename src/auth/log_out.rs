//! Log-out route handler that deletes the session and clears the session cookie.

use axum::{Json, extract::State, http::HeaderMap};
use axum_extra::extract::CookieJar;

use crate::{
    Error, MessageBody,
    auth::{
        cookie::invalidate_session_cookie, middleware::AuthState, session::delete_session,
        session_token::get_session_token,
    },
    db::lock_connection,
};

/// Delete the session for the token in the request, if any, and clear the session cookie.
///
/// Logging out succeeds whether or not the token belonged to a session.
///
/// # Errors
///
/// Returns an error only if the database could not be accessed.
pub async fn post_log_out(
    State(state): State<AuthState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<MessageBody>), Error> {
    if let Some(session_token) = get_session_token(&headers) {
        let connection = lock_connection(&state.db_connection)?;
        let rows_affected = delete_session(&session_token, &connection)?;
        tracing::debug!("Log out deleted {rows_affected} session(s)");
    }

    Ok((
        invalidate_session_cookie(jar),
        Json(MessageBody::new("Logged out successfully")),
    ))
}

#[cfg(test)]
mod log_out_tests {
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::{
        MessageBody, build_router,
        auth::{COOKIE_SESSION_TOKEN, get_user_by_session_token},
        endpoints,
        test_utils::{create_test_state, create_test_user},
    };

    #[tokio::test]
    async fn log_out_deletes_session_and_clears_cookie() {
        let state = create_test_state();
        let (_, token) = create_test_user(&state.db_connection, "ada@example.com");
        let server = TestServer::new(build_router(state.clone())).unwrap();

        let response = server
            .post(endpoints::LOG_OUT)
            .add_cookie(Cookie::new(COOKIE_SESSION_TOKEN, token.clone()))
            .await;

        response.assert_status_ok();
        response.assert_json(&MessageBody::new("Logged out successfully"));
        let cookie = response.cookie(COOKIE_SESSION_TOKEN);
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_user_by_session_token(&token, OffsetDateTime::now_utc(), &connection).unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn log_out_with_bearer_token_deletes_session() {
        let state = create_test_state();
        let (_, token) = create_test_user(&state.db_connection, "ada@example.com");
        let server = TestServer::new(build_router(state.clone())).unwrap();

        server
            .post(endpoints::LOG_OUT)
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status_ok();

        server
            .get(endpoints::ME)
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn log_out_without_session_succeeds() {
        let server = TestServer::new(build_router(create_test_state())).unwrap();

        server.post(endpoints::LOG_OUT).await.assert_status_ok();
        server
            .post(endpoints::LOG_OUT)
            .add_header("Authorization", "Bearer never-issued")
            .await
            .assert_status_ok();
    }
}
