use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{Error, db::lock_connection, user::User};

use super::{
    core::{Transaction, TransactionUpdate, update_transaction},
    create_endpoint::TransactionState,
    get_endpoint::parse_transaction_id,
};

/// A route handler that applies a partial update to one of the logged in
/// user's transactions and responds with the updated transaction.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
    Path(transaction_id): Path<String>,
    Json(update): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, Error> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;

    update_transaction(transaction_id, user.id, update, &connection).map(Json)
}
