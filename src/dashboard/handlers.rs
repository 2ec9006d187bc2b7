//! Dashboard and analytics HTTP handlers.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    dashboard::aggregation::{DashboardStats, MonthlyTotals, dashboard_stats, monthly_totals},
    db::lock_connection,
    transaction::{TransactionFilter, list_transactions},
    user::User,
};

/// Number of days to look back for the monthly analytics.
const YEARLY_PERIOD_DAYS: i64 = 365;

/// The state needed for the dashboard and analytics endpoints.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the logged in user's summary statistics.
pub async fn get_dashboard_stats(
    State(state): State<DashboardState>,
    Extension(user): Extension<User>,
) -> Result<Json<DashboardStats>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let transactions = list_transactions(user.id, &TransactionFilter::default(), &connection)?;

    Ok(Json(dashboard_stats(&transactions)))
}

/// Route handler for the logged in user's income and expenses per month over
/// the last year.
pub async fn get_monthly_analytics(
    State(state): State<DashboardState>,
    Extension(user): Extension<User>,
) -> Result<Json<BTreeMap<String, MonthlyTotals>>, Error> {
    let end = OffsetDateTime::now_utc();
    let start = end - Duration::days(YEARLY_PERIOD_DAYS);

    let connection = lock_connection(&state.db_connection)?;
    let transactions = list_transactions(
        user.id,
        &TransactionFilter {
            category: None,
            start: Some(start),
            end: Some(end),
        },
        &connection,
    )?;

    Ok(Json(monthly_totals(&transactions, start..=end)))
}
