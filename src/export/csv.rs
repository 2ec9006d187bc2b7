//! Renders transactions as a CSV file.

use time::{UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, transaction::Transaction};

/// The calendar date format used in reports, e.g. "2025-10-05".
pub(crate) const REPORT_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]");

/// The column headings shared by the CSV and PDF reports.
pub(crate) const REPORT_COLUMNS: [&str; 5] = ["Date", "Type", "Category", "Description", "Amount"];

/// Format the UTC calendar date of a transaction for a report.
pub(crate) fn format_report_date(transaction: &Transaction) -> Result<String, Error> {
    transaction
        .date
        .to_offset(UtcOffset::UTC)
        .format(REPORT_DATE_FORMAT)
        .map_err(|error| Error::ExportError(error.to_string()))
}

/// Write `transactions` as CSV with a header row, one row per transaction in
/// the order given.
///
/// # Errors
///
/// Returns an [Error::ExportError] if a row could not be written.
pub fn render_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(REPORT_COLUMNS)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                format_report_date(transaction)?,
                transaction.kind.to_string(),
                transaction.category.clone(),
                transaction.description.clone(),
                transaction.amount.to_string(),
            ])
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))
}

#[cfg(test)]
mod render_csv_tests {
    use time::macros::datetime;

    use crate::{
        transaction::{Transaction, TransactionId, TransactionType},
        user::UserId,
    };

    use super::render_csv;

    fn transaction(
        kind: TransactionType,
        amount: f64,
        category: &str,
        description: &str,
        date: time::OffsetDateTime,
    ) -> Transaction {
        Transaction {
            id: TransactionId::new_random(),
            user_id: UserId::new_random(),
            kind,
            amount,
            category: category.to_owned(),
            description: description.to_owned(),
            date,
            created_at: date,
        }
    }

    #[test]
    fn writes_header_and_rows_in_order() {
        let transactions = vec![
            transaction(
                TransactionType::Income,
                2000.0,
                "Salary",
                "October pay",
                datetime!(2025-10-15 09:00 UTC),
            ),
            transaction(
                TransactionType::Expense,
                54.3,
                "Food & Dining",
                "Weekly groceries",
                datetime!(2025-10-05 10:30 UTC),
            ),
        ];

        let got = String::from_utf8(render_csv(&transactions).unwrap()).unwrap();

        assert_eq!(
            got,
            "Date,Type,Category,Description,Amount\n\
             2025-10-15,income,Salary,October pay,2000\n\
             2025-10-05,expense,Food & Dining,Weekly groceries,54.3\n"
        );
    }

    #[test]
    fn quotes_fields_with_commas() {
        let transactions = vec![transaction(
            TransactionType::Expense,
            12.5,
            "Food & Dining",
            "Coffee, cake",
            datetime!(2025-10-05 10:30 UTC),
        )];

        let got = String::from_utf8(render_csv(&transactions).unwrap()).unwrap();

        assert!(got.contains("\"Coffee, cake\""));
    }

    #[test]
    fn uses_utc_calendar_date() {
        let transactions = vec![transaction(
            TransactionType::Expense,
            1.0,
            "Food & Dining",
            "",
            datetime!(2025-10-01 05:00 +13:00),
        )];

        let got = String::from_utf8(render_csv(&transactions).unwrap()).unwrap();

        assert!(got.contains("2025-09-30,expense"));
    }

    #[test]
    fn empty_list_is_header_only() {
        let got = String::from_utf8(render_csv(&[]).unwrap()).unwrap();

        assert_eq!(got, "Date,Type,Category,Description,Amount\n");
    }
}
