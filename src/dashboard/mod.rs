//! Dashboard module
//!
//! Provides summary statistics and monthly income and expense totals over a
//! user's transactions.

mod aggregation;
mod handlers;

pub use aggregation::dashboard_stats;
pub use handlers::{get_dashboard_stats, get_monthly_analytics};
