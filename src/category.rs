//! The suggested transaction categories.
//!
//! Categories are free text. These lists are what the web client offers in
//! its pickers, the server does not check transactions against them.

use axum::Json;
use serde::{Deserialize, Serialize};

/// Suggested categories for expenses.
pub const EXPENSE_CATEGORIES: [&str; 13] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Education",
    "Travel",
    "Home & Garden",
    "Personal Care",
    "Gifts & Donations",
    "Business",
    "Others",
];

/// Suggested categories for income.
pub const INCOME_CATEGORIES: [&str; 7] = [
    "Salary",
    "Freelance",
    "Investment",
    "Business",
    "Rental",
    "Gifts",
    "Others",
];

/// The suggested categories for each transaction type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    /// Suggested categories for expenses.
    pub expense_categories: Vec<String>,
    /// Suggested categories for income.
    pub income_categories: Vec<String>,
}

/// Route handler for the suggested categories. Does not require log in.
pub async fn get_categories() -> Json<Categories> {
    Json(Categories {
        expense_categories: EXPENSE_CATEGORIES.map(str::to_owned).to_vec(),
        income_categories: INCOME_CATEGORIES.map(str::to_owned).to_vec(),
    })
}
