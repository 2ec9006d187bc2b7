//! Storage format for date-times.
//!
//! Date-times are converted to UTC and written with a fixed width so that
//! comparing the stored strings in SQL gives the same answer as comparing
//! the instants they represent.
//!
//! Incoming date-times are read leniently: an offset is optional and a
//! date-time without one is taken to be in UTC.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

/// Date-time format for stored timestamps, e.g. "2025-10-05T13:45:00.000000000Z".
const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z");

/// Date-times without an offset, e.g. "2025-10-05T10:30:00.123456".
const NAIVE_FORMATS: [&[BorrowedFormatItem]; 3] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

/// Parse a date-time sent by a client.
///
/// Accepts, in order:
/// - an RFC 3339 date-time, e.g. "2025-10-05T10:30:00+13:00" or "...Z",
/// - an ISO 8601 date-time without an offset, which is taken to be UTC,
/// - a plain `YYYY-MM-DD` date, meaning midnight UTC at the start of that day.
///
/// Returns `None` if `text` is none of these.
pub(crate) fn parse_date_time(text: &str) -> Option<OffsetDateTime> {
    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(date_time);
    }

    if let Some(date_time) = NAIVE_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(text, format).ok())
    {
        return Some(date_time.assume_utc());
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// Serde helpers for date-times in request and response bodies.
///
/// Serializes as RFC 3339 and deserializes with [parse_date_time].
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer, de::Error};
    use time::OffsetDateTime;

    pub use time::serde::rfc3339::serialize;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;

        super::parse_date_time(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid date-time \"{text}\"")))
    }

    /// The same as [lenient](super::lenient), for optional fields.
    pub mod option {
        use serde::{Deserialize, Deserializer, de::Error};
        use time::OffsetDateTime;

        pub use time::serde::rfc3339::option::serialize;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|text| {
                    super::super::parse_date_time(&text)
                        .ok_or_else(|| D::Error::custom(format!("invalid date-time \"{text}\"")))
                })
                .transpose()
        }
    }
}

/// A date-time as it is read from and written to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SqlTimestamp(pub OffsetDateTime);

impl ToSql for SqlTimestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text = self
            .0
            .to_offset(UtcOffset::UTC)
            .format(TIMESTAMP_FORMAT)
            .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;

        Ok(ToSqlOutput::from(text))
    }
}

impl FromSql for SqlTimestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT)
            .map(|date_time| SqlTimestamp(date_time.assume_utc()))
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
