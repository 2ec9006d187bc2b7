//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error,
    database_id::{uuid_from_sql, uuid_to_sql},
    timestamp::SqlTimestamp,
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// A newtype wrapper for transaction IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new, random transaction ID.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for TransactionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(uuid_to_sql(&self.0))
    }
}

impl FromSql for TransactionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        uuid_from_sql(value).map(Self)
    }
}

/// Whether money was earned or spent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in JSON, CSV and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The name with a leading capital, e.g. "Income".
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid transaction type \"{other}\"").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserId,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The amount of money spent or earned, in no particular currency.
    pub amount: f64,
    /// A free-text category, e.g. "Food & Dining".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened, as chosen by the user.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The fields a client supplies to create a transaction.
///
/// The values are stored as given, the amount is not checked for sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// A free-text category.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    #[serde(with = "crate::timestamp::lenient")]
    pub date: OffsetDateTime,
}

/// A partial update to a transaction.
///
/// Only the fields that are present (and not null) are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    /// The new transaction type.
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionType>,
    /// The new amount.
    #[serde(default)]
    pub amount: Option<f64>,
    /// The new category.
    #[serde(default)]
    pub category: Option<String>,
    /// The new description.
    #[serde(default)]
    pub description: Option<String>,
    /// The new date.
    #[serde(default, with = "crate::timestamp::lenient::option")]
    pub date: Option<OffsetDateTime>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                type TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Every query filters on the owner and most sort by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if `user_id` does not refer
/// to a user or there is some other SQL error.
pub fn create_transaction(
    user_id: UserId,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (id, user_id, type, amount, category, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, user_id, type, amount, category, description, date, created_at",
        )?
        .query_row(
            (
                TransactionId::new_random(),
                user_id,
                new_transaction.kind,
                new_transaction.amount,
                new_transaction.category,
                new_transaction.description,
                SqlTimestamp(new_transaction.date),
                SqlTimestamp(OffsetDateTime::now_utc()),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, type, amount, category, description, date, created_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            rusqlite::named_params! { ":id": id, ":user_id": user_id },
            map_transaction_row,
        )
        .map_err(not_found_as_transaction)?;

    Ok(transaction)
}

/// Apply `update` to the transaction `id` owned by `user_id` and return the
/// updated transaction.
///
/// Fields that are `None` in `update` keep their stored values. Concurrent
/// updates are not detected, the last one to run wins.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "UPDATE \"transaction\"
             SET
                type = COALESCE(?1, type),
                amount = COALESCE(?2, amount),
                category = COALESCE(?3, category),
                description = COALESCE(?4, description),
                date = COALESCE(?5, date)
             WHERE id = ?6 AND user_id = ?7
             RETURNING id, user_id, type, amount, category, description, date, created_at",
        )?
        .query_row(
            (
                update.kind,
                update.amount,
                update.category,
                update.description,
                update.date.map(SqlTimestamp),
                id,
                user_id,
            ),
            map_transaction_row,
        )
        .map_err(not_found_as_transaction)?;

    Ok(transaction)
}

/// Delete the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    match rows_affected {
        0 => Err(Error::TransactionNotFound),
        _ => Ok(()),
    }
}

fn not_found_as_transaction(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
        error => error.into(),
    }
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let kind = row.get(2)?;
    let amount = row.get(3)?;
    let category = row.get(4)?;
    let description = row.get(5)?;
    let date: SqlTimestamp = row.get(6)?;
    let created_at: SqlTimestamp = row.get(7)?;

    Ok(Transaction {
        id,
        user_id,
        kind,
        amount,
        category,
        description,
        date: date.0,
        created_at: created_at.0,
    })
}

// ============================================================================
// TESTS
// ============================================================================
