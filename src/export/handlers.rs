//! Route handlers for downloading a user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    export::{csv::render_csv, pdf::render_pdf},
    transaction::{Transaction, TransactionFilter, list_transactions},
    user::User,
};

/// The state needed for exporting transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler that downloads the logged in user's transactions as CSV.
pub async fn export_csv(
    State(state): State<ExportState>,
    Extension(user): Extension<User>,
) -> Result<Response, Error> {
    let transactions = get_all_transactions(&state, &user)?;
    let body = render_csv(&transactions)?;

    Ok(attachment("text/csv", "transactions.csv", body))
}

/// Route handler that downloads the logged in user's transactions as a PDF report.
pub async fn export_pdf(
    State(state): State<ExportState>,
    Extension(user): Extension<User>,
) -> Result<Response, Error> {
    let transactions = get_all_transactions(&state, &user)?;
    let body = render_pdf(&transactions)?;

    Ok(attachment("application/pdf", "transactions.pdf", body))
}

fn get_all_transactions(state: &ExportState, user: &User) -> Result<Vec<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(user.id, &TransactionFilter::default(), &connection)
}

fn attachment(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, content_type.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename={file_name}"),
            ),
        ],
        body,
    )
        .into_response()
}
