//! The log-in route exchanges an identity provider session ID for a session.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::HeaderMap,
};
use axum_extra::extract::CookieJar;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        IdentityProvider, ProviderSession, SESSION_ID_HEADER, cookie::set_session_cookie,
        session::create_session,
    },
    db::lock_connection,
    user::{NewUser, User, get_or_create_user},
};

/// The state needed for logging in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The database connection for managing users and sessions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The identity provider that verifies session IDs.
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// How long new sessions last.
    pub session_duration: Duration,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            identity_provider: state.identity_provider.clone(),
            session_duration: state.session_duration,
        }
    }
}

/// The response to a successful log in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// The logged in user.
    pub user: User,
    /// The token the client must present on later requests.
    pub session_token: String,
}

/// Route handler that logs a user in with the session ID in the `X-Session-ID` header.
///
/// On success the response body carries the user and session token, and the
/// session cookie is set for browser clients.
///
/// # Errors
///
/// Returns a:
/// - [Error::MissingSessionId] if the header is absent or empty,
/// - [Error::IdentityProviderRejected] if the identity provider does not accept the session ID,
/// - [Error::IdentityProviderUnavailable] if the identity provider could not be reached.
pub async fn get_session_data(
    State(state): State<LogInState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<SessionData>), Error> {
    let session_id = headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or(Error::MissingSessionId)?;

    let provider_session = state.identity_provider.get_session_data(session_id).await?;

    let session_data = {
        let connection = lock_connection(&state.db_connection)?;
        establish_session(provider_session, state.session_duration, &connection)?
    };

    tracing::info!("User {} logged in", session_data.user.id);
    let jar = set_session_cookie(
        jar,
        session_data.session_token.clone(),
        state.session_duration,
    );

    Ok((jar, Json(session_data)))
}

/// Find or create the user for `provider_session` and start a session for
/// them with the provider's session token.
///
/// A new session is created on every log in, even for returning users.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub(crate) fn establish_session(
    provider_session: ProviderSession,
    duration: Duration,
    connection: &Connection,
) -> Result<SessionData, Error> {
    let ProviderSession {
        email,
        name,
        picture,
        session_token,
    } = provider_session;

    let user = get_or_create_user(
        NewUser {
            email,
            name,
            picture,
        },
        connection,
    )?;
    create_session(user.id, &session_token, duration, connection)?;

    Ok(SessionData {
        user,
        session_token,
    })
}
