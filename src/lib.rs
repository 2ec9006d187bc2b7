//! Spendwise is a personal finance tracker.
//!
//! Users log in through an external identity provider, record income and
//! expense transactions, view aggregate statistics, and export their data as
//! CSV or PDF. This library provides the JSON REST API for the web client.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod export;
mod logging;
mod not_found;
mod routing;
mod timestamp;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    DEFAULT_SESSION_DURATION, DEFAULT_SESSION_DATA_URL, HttpIdentityProvider, IdentityProvider,
    ProviderSession,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{TRANSACTION_QUERY_LIMIT, Transaction, TransactionId, TransactionType};
pub use user::{User, UserId};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The log-in request did not carry the session ID issued by the
    /// identity provider.
    #[error("the X-Session-ID header is missing")]
    MissingSessionId,

    /// The request has no session token, or the token does not belong to a
    /// live session.
    #[error("not authenticated")]
    Unauthenticated,

    /// The identity provider responded, but refused the session ID.
    #[error("the identity provider rejected the session ID")]
    IdentityProviderRejected,

    /// The identity provider could not be reached.
    ///
    /// The string is the transport error and should only be logged.
    #[error("could not reach the identity provider: {0}")]
    IdentityProviderUnavailable(String),

    /// The identity provider accepted the session ID but its response body
    /// could not be decoded.
    #[error("the identity provider sent an invalid session document: {0}")]
    InvalidSessionData(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by other users are reported as not found too, so
    /// callers cannot probe for the existence of other users' data.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The requested transaction does not exist or belongs to another user.
    #[error("the requested transaction could not be found")]
    TransactionNotFound,

    /// A date used to filter transactions could not be parsed.
    #[error("invalid date \"{0}\", expected an ISO 8601 date-time or a YYYY-MM-DD date")]
    InvalidDateFilter(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A CSV or PDF report could not be rendered.
    #[error("could not export transactions: {0}")]
    ExportError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// A JSON body with a human readable confirmation, e.g. after logging out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Error::MissingSessionId => (StatusCode::BAD_REQUEST, "Session ID required".to_owned()),
            Error::InvalidDateFilter(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::Unauthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated".to_owned()),
            Error::IdentityProviderRejected => {
                (StatusCode::UNAUTHORIZED, "Invalid session".to_owned())
            }
            Error::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
            Error::TransactionNotFound => {
                (StatusCode::NOT_FOUND, "Transaction not found".to_owned())
            }
            Error::IdentityProviderUnavailable(_) | Error::InvalidSessionData(_) => {
                tracing::error!("Log in failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication service error".to_owned(),
                )
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}
