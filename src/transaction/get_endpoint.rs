use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{Error, db::lock_connection, user::User};

use super::{
    core::{Transaction, TransactionId, get_transaction},
    create_endpoint::TransactionState,
};

/// Parse the transaction ID from a request path.
///
/// IDs that are not UUIDs cannot refer to a transaction, so they are reported
/// as not found.
pub(crate) fn parse_transaction_id(raw_id: &str) -> Result<TransactionId, Error> {
    raw_id.parse().map_err(|_| Error::TransactionNotFound)
}

/// A route handler that returns one of the logged in user's transactions.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Transaction>, Error> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(transaction_id, user.id, &connection).map(Json)
}
