//! Sessions bind a session token issued by the identity provider to a user.
//!
//! A session is live while its expiry is in the future. Expired sessions
//! are never removed; lookups ignore them.

use rusqlite::{Connection, OptionalExtension};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    Error,
    database_id::uuid_to_sql,
    timestamp::SqlTimestamp,
    user::{User, UserId, map_user_row_with_offset},
};

/// How long a session lasts after log in.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(7);

/// A logged in client session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The ID of the session row.
    pub id: Uuid,
    /// The user the session belongs to.
    pub user_id: UserId,
    /// The opaque bearer credential presented by the client.
    pub session_token: String,
    /// The session is valid strictly before this instant.
    pub expires_at: OffsetDateTime,
    /// When the session was created.
    pub created_at: OffsetDateTime,
}

/// Create the session table.
///
/// A user may hold any number of sessions at once.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS session (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                session_token TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_session_token ON session(session_token);",
        (),
    )?;

    Ok(())
}

/// Create a session for `user_id` that expires `duration` from now.
///
/// # Errors
///
/// Returns a [Error::SqlError] if `user_id` does not refer to a user or
/// some other SQL error occurred.
pub fn create_session(
    user_id: UserId,
    session_token: &str,
    duration: Duration,
    connection: &Connection,
) -> Result<Session, Error> {
    let created_at = OffsetDateTime::now_utc();
    let session = Session {
        id: Uuid::new_v4(),
        user_id,
        session_token: session_token.to_owned(),
        expires_at: created_at + duration,
        created_at,
    };

    connection.execute(
        "INSERT INTO session (id, user_id, session_token, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            uuid_to_sql(&session.id),
            session.user_id,
            &session.session_token,
            SqlTimestamp(session.expires_at),
            SqlTimestamp(session.created_at),
        ),
    )?;

    Ok(session)
}

/// Get the user that owns the session with `session_token`, provided the
/// session expires strictly after `now`.
///
/// Returns `None` for unknown and expired tokens.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_user_by_session_token(
    session_token: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Option<User>, Error> {
    connection
        .prepare(
            "SELECT user.id, user.email, user.name, user.picture, user.created_at
             FROM session INNER JOIN user ON user.id = session.user_id
             WHERE session.session_token = ?1 AND session.expires_at > ?2
             LIMIT 1",
        )?
        .query_row((session_token, SqlTimestamp(now)), |row| {
            map_user_row_with_offset(row, 0)
        })
        .optional()
        .map_err(|error| error.into())
}

type RowsAffected = usize;

/// Delete the session with `session_token`.
///
/// Deleting a token that has no session is not an error, zero rows are
/// affected.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn delete_session(session_token: &str, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM session WHERE session_token = :session_token",
            &[(":session_token", &session_token)],
        )
        .map_err(|error| error.into())
}
