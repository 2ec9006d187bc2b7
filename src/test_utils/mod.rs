#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{DEFAULT_SESSION_DURATION, IdentityProvider, ProviderSession, create_session},
    db::initialize,
    user::{NewUser, User, create_user},
};

/// An identity provider that accepts session IDs of the form "<name>-session".
///
/// The session ID "unreachable" behaves like a provider that is down, and
/// anything else is rejected.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubIdentityProvider;

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn get_session_data(&self, session_id: &str) -> Result<ProviderSession, Error> {
        if session_id == "unreachable" {
            return Err(Error::IdentityProviderUnavailable(
                "connection refused".to_owned(),
            ));
        }

        match session_id.strip_suffix("-session") {
            Some(name) if !name.is_empty() => Ok(provider_session(
                &format!("{name}@example.com"),
                &format!("{name}-token"),
            )),
            _ => Err(Error::IdentityProviderRejected),
        }
    }
}

pub(crate) fn provider_session(email: &str, session_token: &str) -> ProviderSession {
    let name = email.split('@').next().unwrap_or(email);

    ProviderSession {
        email: email.to_owned(),
        name: name.to_owned(),
        picture: format!("https://example.com/{name}.png"),
        session_token: session_token.to_owned(),
    }
}

#[track_caller]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

#[track_caller]
pub(crate) fn create_test_state() -> AppState {
    AppState::new(must_create_test_connection(), StubIdentityProvider)
        .expect("Could not create app state")
}

#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> User {
    let name = email.split('@').next().unwrap_or(email);

    create_user(
        NewUser {
            email: email.to_owned(),
            name: name.to_owned(),
            picture: format!("https://example.com/{name}.png"),
        },
        connection,
    )
    .expect("Could not create test user")
}

/// Create a user with a live session, returning the user and their session token.
#[track_caller]
pub(crate) fn create_test_user(
    db_connection: &Arc<Mutex<Connection>>,
    email: &str,
) -> (User, String) {
    let connection = db_connection.lock().expect("Could not lock database");
    let user = insert_test_user(&connection, email);
    let session_token = format!("{}-token", user.id);
    create_session(
        user.id,
        &session_token,
        DEFAULT_SESSION_DURATION,
        &connection,
    )
    .expect("Could not create test session");

    (user, session_token)
}
