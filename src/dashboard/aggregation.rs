//! Transaction aggregation for the dashboard and analytics endpoints.
//!
//! Provides functions to total income and expenses, break amounts down by
//! category, and group totals by calendar month.

use std::{collections::BTreeMap, ops::RangeInclusive};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::transaction::{Transaction, TransactionType};

/// Key format for monthly totals, e.g. "2025-10".
const MONTH_KEY_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]");

/// Summary statistics over a user's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Sum of all income amounts.
    pub total_income: f64,
    /// Sum of all expense amounts.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// The number of transactions the statistics cover.
    pub transactions_count: usize,
    /// Sum of amounts per category, income and expenses combined.
    pub category_breakdown: BTreeMap<String, f64>,
}

/// Income and expenses for one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// Sum of income amounts in the month.
    pub income: f64,
    /// Sum of expense amounts in the month.
    pub expenses: f64,
}

/// Calculate the dashboard statistics for `transactions`.
pub fn dashboard_stats(transactions: &[Transaction]) -> DashboardStats {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut category_breakdown = BTreeMap::new();

    for transaction in transactions {
        match transaction.kind {
            TransactionType::Income => total_income += transaction.amount,
            TransactionType::Expense => total_expenses += transaction.amount,
        }

        *category_breakdown
            .entry(transaction.category.clone())
            .or_insert(0.0) += transaction.amount;
    }

    DashboardStats {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        transactions_count: transactions.len(),
        category_breakdown,
    }
}

/// Group the transactions dated within `window` by UTC calendar month.
///
/// Months without transactions are omitted. Keys are "YYYY-MM" strings, so
/// the map iterates in chronological order.
pub fn monthly_totals(
    transactions: &[Transaction],
    window: RangeInclusive<OffsetDateTime>,
) -> BTreeMap<String, MonthlyTotals> {
    let mut totals: BTreeMap<String, MonthlyTotals> = BTreeMap::new();

    for transaction in transactions {
        if !window.contains(&transaction.date) {
            continue;
        }

        let Some(month) = month_key(transaction.date) else {
            tracing::warn!(
                "Skipping transaction {} with unformattable date {}",
                transaction.id,
                transaction.date
            );
            continue;
        };

        let month_totals = totals.entry(month).or_default();
        match transaction.kind {
            TransactionType::Income => month_totals.income += transaction.amount,
            TransactionType::Expense => month_totals.expenses += transaction.amount,
        }
    }

    totals
}

fn month_key(date: OffsetDateTime) -> Option<String> {
    date.to_offset(UtcOffset::UTC).format(MONTH_KEY_FORMAT).ok()
}


#[cfg(test)]
mod monthly_totals_tests {
    use std::collections::BTreeMap;

    use time::{Duration, macros::datetime};

    use crate::transaction::TransactionType;

    use super::{MonthlyTotals, dashboard_stats_tests::transaction, monthly_totals};

    #[test]
    fn groups_by_month_and_type() {
        let now = datetime!(2025-10-18 12:00 UTC);
        let transactions = vec![
            transaction(
                TransactionType::Income,
                2000.0,
                "Salary",
                datetime!(2025-09-01 09:00 UTC),
            ),
            transaction(
                TransactionType::Expense,
                50.0,
                "Food",
                datetime!(2025-09-15 18:00 UTC),
            ),
            transaction(
                TransactionType::Expense,
                20.0,
                "Food",
                datetime!(2025-10-02 18:00 UTC),
            ),
            transaction(
                TransactionType::Expense,
                5.0,
                "Food",
                datetime!(2025-10-03 18:00 UTC),
            ),
        ];

        let got = monthly_totals(&transactions, now - Duration::days(365)..=now);

        assert_eq!(
            got,
            BTreeMap::from([
                (
                    "2025-09".to_owned(),
                    MonthlyTotals {
                        income: 2000.0,
                        expenses: 50.0
                    }
                ),
                (
                    "2025-10".to_owned(),
                    MonthlyTotals {
                        income: 0.0,
                        expenses: 25.0
                    }
                ),
            ])
        );
    }

    #[test]
    fn omits_months_without_transactions() {
        let now = datetime!(2025-10-18 12:00 UTC);
        let transactions = vec![
            transaction(
                TransactionType::Expense,
                10.0,
                "Food",
                datetime!(2025-06-01 09:00 UTC),
            ),
            transaction(
                TransactionType::Expense,
                10.0,
                "Food",
                datetime!(2025-08-01 09:00 UTC),
            ),
        ];

        let got = monthly_totals(&transactions, now - Duration::days(365)..=now);

        assert_eq!(
            got.keys().collect::<Vec<_>>(),
            vec!["2025-06", "2025-08"]
        );
    }

    #[test]
    fn excludes_transactions_outside_window() {
        let now = datetime!(2025-10-18 12:00 UTC);
        let window = now - Duration::days(365)..=now;
        let transactions = vec![
            transaction(
                TransactionType::Expense,
                10.0,
                "Food",
                *window.start() - Duration::seconds(1),
            ),
            transaction(TransactionType::Expense, 10.0, "Food", *window.start()),
            transaction(
                TransactionType::Expense,
                10.0,
                "Food",
                now + Duration::days(1),
            ),
        ];

        let got = monthly_totals(&transactions, window);

        assert_eq!(
            got,
            BTreeMap::from([(
                "2024-10".to_owned(),
                MonthlyTotals {
                    income: 0.0,
                    expenses: 10.0
                }
            )])
        );
    }

    #[test]
    fn buckets_by_utc_month() {
        let now = datetime!(2025-10-18 12:00 UTC);
        // 2025-10-01 05:00 at +13:00 is still September in UTC.
        let transactions = vec![transaction(
            TransactionType::Income,
            100.0,
            "Freelance",
            datetime!(2025-10-01 05:00 +13:00),
        )];

        let got = monthly_totals(&transactions, now - Duration::days(365)..=now);

        assert_eq!(got.keys().collect::<Vec<_>>(), vec!["2025-09"]);
    }
}
