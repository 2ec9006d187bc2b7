//! Database query helpers for listing transactions.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    timestamp::{SqlTimestamp, parse_date_time},
    user::UserId,
};

use super::core::{Transaction, map_transaction_row};

/// The most transactions a single list query returns.
pub const TRANSACTION_QUERY_LIMIT: usize = 1000;

/// Optional conditions for a transaction list query.
///
/// `start` and `end` are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions with exactly this category.
    pub category: Option<String>,
    /// Only include transactions on or after this instant.
    pub start: Option<OffsetDateTime>,
    /// Only include transactions on or before this instant.
    pub end: Option<OffsetDateTime>,
}

/// Get the transactions owned by `user_id` that match `filter`, newest first.
///
/// Transactions with the same date are ordered by when they were recorded,
/// newest first. At most [TRANSACTION_QUERY_LIMIT] transactions are returned.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn list_transactions(
    user_id: UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, amount, category, description, date, created_at
             FROM \"transaction\"
             WHERE user_id = ?1
                AND (?2 IS NULL OR category = ?2)
                AND (?3 IS NULL OR date >= ?3)
                AND (?4 IS NULL OR date <= ?4)
             ORDER BY date DESC, created_at DESC, rowid DESC
             LIMIT ?5",
        )?
        .query_map(
            (
                user_id,
                filter.category.as_deref(),
                filter.start.map(SqlTimestamp),
                filter.end.map(SqlTimestamp),
                TRANSACTION_QUERY_LIMIT as i64,
            ),
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Parse a date filter from a query string.
///
/// Accepts an RFC 3339 date-time, an ISO 8601 date-time without an offset
/// (taken to be UTC), or a plain `YYYY-MM-DD` date which is taken to mean
/// midnight UTC at the start of that day.
///
/// # Errors
/// Returns [Error::InvalidDateFilter] if `text` is none of these formats.
pub fn parse_date_filter(text: &str) -> Result<OffsetDateTime, Error> {
    parse_date_time(text).ok_or_else(|| Error::InvalidDateFilter(text.to_owned()))
}

#[cfg(test)]
mod list_transactions_tests {
    use time::{Duration, macros::datetime};

    use crate::{
        Error,
        test_utils::{insert_test_user, must_create_test_connection},
        transaction::{NewTransaction, TransactionType, create_transaction},
    };

    use super::{
        TRANSACTION_QUERY_LIMIT, TransactionFilter, list_transactions, parse_date_filter,
    };

    fn new_transaction(category: &str, date: time::OffsetDateTime) -> NewTransaction {
        NewTransaction {
            kind: TransactionType::Expense,
            amount: 10.0,
            category: category.to_owned(),
            description: String::new(),
            date,
        }
    }

    #[test]
    fn returns_newest_first() {
        let conn = must_create_test_connection();
        let user = insert_test_user(&conn, "ada@example.com");
        let older = create_transaction(
            user.id,
            new_transaction("Food & Dining", datetime!(2025-09-01 12:00 UTC)),
            &conn,
        )
        .unwrap();
        let newer = create_transaction(
            user.id,
            new_transaction("Transportation", datetime!(2025-10-01 12:00 UTC)),
            &conn,
        )
        .unwrap();

        let got = list_transactions(user.id, &TransactionFilter::default(), &conn).unwrap();

        assert_eq!(got, vec![newer, older]);
    }

    #[test]
    fn ties_on_date_are_ordered_by_creation_time() {
        let conn = must_create_test_connection();
        let user = insert_test_user(&conn, "ada@example.com");
        let date = datetime!(2025-10-01 12:00 UTC);
        let first = create_transaction(user.id, new_transaction("A", date), &conn).unwrap();
        let second = create_transaction(user.id, new_transaction("B", date), &conn).unwrap();

        let got = list_transactions(user.id, &TransactionFilter::default(), &conn).unwrap();

        assert_eq!(got, vec![second, first]);
    }

    #[test]
    fn filters_by_category() {
        let conn = must_create_test_connection();
        let user = insert_test_user(&conn, "ada@example.com");
        let food = create_transaction(
            user.id,
            new_transaction("Food & Dining", datetime!(2025-10-01 12:00 UTC)),
            &conn,
        )
        .unwrap();
        create_transaction(
            user.id,
            new_transaction("Transportation", datetime!(2025-10-02 12:00 UTC)),
            &conn,
        )
        .unwrap();

        let got = list_transactions(
            user.id,
            &TransactionFilter {
                category: Some("Food & Dining".to_owned()),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![food]);
    }

    #[test]
    fn category_filter_returns_matching_expenses_newest_first() {
        let conn = must_create_test_connection();
        let user = insert_test_user(&conn, "ada@example.com");
        let lunch = create_transaction(
            user.id,
            new_transaction("Food", datetime!(2025-10-01 12:00 UTC)),
            &conn,
        )
        .unwrap();
        let dinner = create_transaction(
            user.id,
            new_transaction("Food", datetime!(2025-10-03 19:00 UTC)),
            &conn,
        )
        .unwrap();
        create_transaction(
            user.id,
            NewTransaction {
                kind: TransactionType::Income,
                amount: 2000.0,
                category: "Salary".to_owned(),
                description: String::new(),
                date: datetime!(2025-10-02 09:00 UTC),
            },
            &conn,
        )
        .unwrap();

        let got = list_transactions(
            user.id,
            &TransactionFilter {
                category: Some("Food".to_owned()),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![dinner, lunch]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let conn = must_create_test_connection();
        let user = insert_test_user(&conn, "ada@example.com");
        let start = datetime!(2025-10-01 00:00 UTC);
        let end = datetime!(2025-10-31 00:00 UTC);
        create_transaction(
            user.id,
            new_transaction("Before", start - Duration::seconds(1)),
            &conn,
        )
        .unwrap();
        let at_start = create_transaction(user.id, new_transaction("Start", start), &conn).unwrap();
        let at_end = create_transaction(user.id, new_transaction("End", end), &conn).unwrap();
        create_transaction(
            user.id,
            new_transaction("After", end + Duration::seconds(1)),
            &conn,
        )
        .unwrap();

        let got = list_transactions(
            user.id,
            &TransactionFilter {
                start: Some(start),
                end: Some(end),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![at_end, at_start]);
    }

    #[test]
    fn date_range_compares_instants_across_offsets() {
        let conn = must_create_test_connection();
        let user = insert_test_user(&conn, "ada@example.com");
        // 2025-10-01 05:00 at +13:00 is 2025-09-30 16:00 UTC.
        create_transaction(
            user.id,
            new_transaction("Food & Dining", datetime!(2025-10-01 05:00 +13:00)),
            &conn,
        )
        .unwrap();

        let got = list_transactions(
            user.id,
            &TransactionFilter {
                start: Some(datetime!(2025-10-01 00:00 UTC)),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![]);
    }

    #[test]
    fn excludes_other_users_transactions() {
        let conn = must_create_test_connection();
        let ada = insert_test_user(&conn, "ada@example.com");
        let grace = insert_test_user(&conn, "grace@example.com");
        create_transaction(
            grace.id,
            new_transaction("Food & Dining", datetime!(2025-10-01 12:00 UTC)),
            &conn,
        )
        .unwrap();

        let got = list_transactions(ada.id, &TransactionFilter::default(), &conn).unwrap();

        assert_eq!(got, vec![]);
    }

    #[test]
    fn caps_number_of_results() {
        let conn = must_create_test_connection();
        let user = insert_test_user(&conn, "ada@example.com");
        let start = datetime!(2025-01-01 00:00 UTC);
        for i in 0..(TRANSACTION_QUERY_LIMIT as i64 + 5) {
            create_transaction(
                user.id,
                new_transaction("Food & Dining", start + Duration::minutes(i)),
                &conn,
            )
            .unwrap();
        }

        let got = list_transactions(user.id, &TransactionFilter::default(), &conn).unwrap();

        assert_eq!(got.len(), TRANSACTION_QUERY_LIMIT);
        assert_eq!(
            got[0].date,
            start + Duration::minutes(TRANSACTION_QUERY_LIMIT as i64 + 4)
        );
    }

    #[test]
    fn parses_rfc3339_date_filter() {
        let got = parse_date_filter("2025-10-05T10:30:00+13:00");

        assert_eq!(got, Ok(datetime!(2025-10-05 10:30 +13:00)));
    }

    #[test]
    fn parses_plain_date_filter_as_utc_midnight() {
        let got = parse_date_filter("2025-10-05");

        assert_eq!(got, Ok(datetime!(2025-10-05 00:00 UTC)));
    }

    #[test]
    fn parses_date_filter_without_offset_as_utc() {
        let got = parse_date_filter("2025-09-18T10:11:12.123456");

        assert_eq!(got, Ok(datetime!(2025-09-18 10:11:12.123456 UTC)));
    }

    #[test]
    fn rejects_malformed_date_filter() {
        let got = parse_date_filter("last tuesday");

        assert_eq!(got, Err(Error::InvalidDateFilter("last tuesday".to_owned())));
    }
}
