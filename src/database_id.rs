//! Helpers for storing UUID-based identifiers in SQLite.
//!
//! IDs are stored as their hyphenated text form.

use rusqlite::types::{FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use uuid::Uuid;

/// Convert `id` into a value that can be bound to an SQL parameter.
pub(crate) fn uuid_to_sql(id: &Uuid) -> ToSqlOutput<'static> {
    ToSqlOutput::from(id.hyphenated().to_string())
}

/// Read a UUID from a TEXT column.
pub(crate) fn uuid_from_sql(value: ValueRef<'_>) -> FromSqlResult<Uuid> {
    let text = value.as_str()?;

    Uuid::parse_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))
}

#[cfg(test)]
mod database_id_tests {
    use rusqlite::{Connection, types::ValueRef};
    use uuid::Uuid;

    use super::{uuid_from_sql, uuid_to_sql};

    #[test]
    fn can_store_and_read_uuid() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE ids (id TEXT NOT NULL)", ())
            .unwrap();
        let want = Uuid::new_v4();

        conn.execute("INSERT INTO ids (id) VALUES (?1)", [uuid_to_sql(&want)])
            .unwrap();
        let got = conn
            .query_row("SELECT id FROM ids", [], |row| {
                uuid_from_sql(row.get_ref(0)?).map_err(|error| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(error),
                    )
                })
            })
            .unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn rejects_malformed_uuid() {
        let result = uuid_from_sql(ValueRef::Text(b"not-a-uuid"));

        assert!(result.is_err());
    }
}
