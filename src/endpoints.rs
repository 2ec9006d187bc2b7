//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}', use [format_endpoint].

use std::fmt::Display;

/// The route for exchanging an identity provider session ID for a session.
pub const SESSION_DATA: &str = "/api/auth/session-data";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/auth/logout";
/// The route for getting the logged in user.
pub const ME: &str = "/api/auth/me";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the dashboard summary statistics.
pub const DASHBOARD_STATS: &str = "/api/dashboard/stats";
/// The route for income and expenses per month.
pub const MONTHLY_ANALYTICS: &str = "/api/analytics/monthly";
/// The route to download transactions as a CSV file.
pub const EXPORT_CSV: &str = "/api/export/csv";
/// The route to download transactions as a PDF report.
pub const EXPORT_PDF: &str = "/api/export/pdf";
/// The route for the suggested transaction categories.
pub const CATEGORIES: &str = "/api/categories";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
