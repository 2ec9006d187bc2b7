use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{Error, db::lock_connection, user::User};

use super::{
    core::Transaction,
    create_endpoint::TransactionState,
    query::{TransactionFilter, list_transactions, parse_date_filter},
};

/// The query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    category: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl ListTransactionsQuery {
    /// Empty parameters, e.g. `?category=`, do not filter anything.
    fn into_filter(self) -> Result<TransactionFilter, Error> {
        let non_empty = |value: Option<String>| value.filter(|value| !value.is_empty());

        Ok(TransactionFilter {
            category: non_empty(self.category),
            start: non_empty(self.start_date)
                .as_deref()
                .map(parse_date_filter)
                .transpose()?,
            end: non_empty(self.end_date)
                .as_deref()
                .map(parse_date_filter)
                .transpose()?,
        })
    }
}

/// A route handler that lists the logged in user's transactions, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = query.into_filter()?;
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(user.id, &filter, &connection).map(Json)
}
