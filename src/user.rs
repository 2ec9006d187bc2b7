//! Code for creating the user table and fetching users from the database.
//!
//! Users are created the first time someone logs in through the identity
//! provider and are identified by their email address from then on.

use std::{fmt::Display, str::FromStr};

use axum::{Extension, Json};
use rusqlite::{
    Connection, OptionalExtension, Row, ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    database_id::{uuid_from_sql, uuid_to_sql},
    timestamp::SqlTimestamp,
};

/// A newtype wrapper for user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new, random user ID.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(uuid_to_sql(&self.0))
    }
}

impl FromSql for UserId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        uuid_from_sql(value).map(Self)
    }
}

/// A user of the application.
///
/// None of the fields change after the user is created: later log ins with
/// a different name or picture do not update the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's stable ID.
    pub id: UserId,
    /// The user's email address, unique across all users.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// URL of the user's profile picture.
    pub picture: String,
    /// When the user first logged in.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The profile used to create a user on their first log in.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's email address.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// URL of the user's profile picture.
    pub picture: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                picture TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred, e.g. the
/// email is already taken.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let user = User {
        id: UserId::new_random(),
        email: new_user.email,
        name: new_user.name,
        picture: new_user.picture,
        created_at: OffsetDateTime::now_utc(),
    };

    connection.execute(
        "INSERT INTO user (id, email, name, picture, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user.id,
            &user.email,
            &user.name,
            &user.picture,
            SqlTimestamp(user.created_at),
        ),
    )?;

    Ok(user)
}

/// Get the user with the email address `email`, if there is one.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<Option<User>, Error> {
    connection
        .prepare("SELECT id, email, name, picture, created_at FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_user_row)
        .optional()
        .map_err(|error| error.into())
}

/// Get the user registered under `new_user.email`, creating them if this is
/// their first log in.
///
/// Existing users are returned as stored; the name and picture in
/// `new_user` are only used when a user is created.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_or_create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    match get_user_by_email(&new_user.email, connection)? {
        Some(user) => Ok(user),
        None => {
            let user = create_user(new_user, connection)?;
            tracing::info!("Created user {} for {}", user.id, user.email);
            Ok(user)
        }
    }
}

/// Map a database row to a [User].
///
/// The row must contain the columns id, email, name, picture and created_at
/// starting at column `offset`.
pub(crate) fn map_user_row_with_offset(row: &Row, offset: usize) -> Result<User, rusqlite::Error> {
    let created_at: SqlTimestamp = row.get(offset + 4)?;

    Ok(User {
        id: row.get(offset)?,
        email: row.get(offset + 1)?,
        name: row.get(offset + 2)?,
        picture: row.get(offset + 3)?,
        created_at: created_at.0,
    })
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    map_user_row_with_offset(row, 0)
}

/// Route handler that returns the logged in user.
pub async fn get_current_user(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
