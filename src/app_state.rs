//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Duration;

use crate::{
    Error,
    auth::{DEFAULT_SESSION_DURATION, IdentityProvider},
    db::initialize,
};

/// The state of the REST server.
///
/// Handlers do not take the whole state, each takes a smaller state struct
/// built from it with `FromRef`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection, opened once at start-up and shared by all handlers.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The identity provider that users log in with.
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// The duration for which new sessions are valid.
    pub session_duration: Duration,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        identity_provider: impl IdentityProvider + 'static,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            identity_provider: Arc::new(identity_provider),
            session_duration: DEFAULT_SESSION_DURATION,
        })
    }
}
