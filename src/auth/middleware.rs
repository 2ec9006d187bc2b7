//! Authentication middleware that resolves the session token to a user.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::{session::get_user_by_session_token, session_token::get_session_token},
    db::lock_connection,
    user::User,
};

/// The state needed for the auth middleware and for logging out.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The database connection for looking up sessions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Resolve the session token in `headers` to a user.
///
/// Returns `None` when there is no token, or the token does not belong to a
/// live session.
///
/// # Errors
///
/// Returns an error if the database could not be queried.
pub(crate) fn resolve_user(headers: &HeaderMap, state: &AuthState) -> Result<Option<User>, Error> {
    let Some(session_token) = get_session_token(headers) else {
        return Ok(None);
    };

    let connection = lock_connection(&state.db_connection)?;

    get_user_by_session_token(&session_token, OffsetDateTime::now_utc(), &connection)
}

/// Middleware function that checks for a valid session token.
///
/// The user is placed into the request and then the request executed normally if the session is
/// valid, otherwise a 401 Unauthorized response is returned before the handler runs.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to
/// receive the user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let user = match resolve_user(&parts.headers, &state) {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!("Rejected unauthenticated request to {}", parts.uri.path());
            return Error::Unauthenticated.into_response();
        }
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(user);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}
