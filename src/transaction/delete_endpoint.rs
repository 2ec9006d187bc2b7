use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{Error, MessageBody, db::lock_connection, user::User};

use super::{
    core::delete_transaction, create_endpoint::TransactionState,
    get_endpoint::parse_transaction_id,
};

/// A route handler for deleting one of the logged in user's transactions.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
    Path(transaction_id): Path<String>,
) -> Result<Json<MessageBody>, Error> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(transaction_id, user.id, &connection)?;
    tracing::debug!("Deleted transaction {transaction_id}");

    Ok(Json(MessageBody::new("Transaction deleted successfully")))
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use axum_test::TestServer;
    use time::macros::datetime;

    use crate::{
        Error, MessageBody, build_router,
        endpoints::{self, format_endpoint},
        test_utils::{create_test_state, create_test_user},
        transaction::{NewTransaction, TransactionType, create_transaction, get_transaction},
    };

    fn groceries() -> NewTransaction {
        NewTransaction {
            kind: TransactionType::Expense,
            amount: 54.3,
            category: "Food & Dining".to_owned(),
            description: String::new(),
            date: datetime!(2025-10-05 10:30 UTC),
        }
    }

    #[tokio::test]
    async fn delete_twice_is_not_found_the_second_time() {
        let state = create_test_state();
        let (user, token) = create_test_user(&state.db_connection, "ada@example.com");
        let transaction =
            create_transaction(user.id, groceries(), &state.db_connection.lock().unwrap())
                .unwrap();
        let server = TestServer::new(build_router(state.clone())).unwrap();
        let endpoint = format_endpoint(endpoints::TRANSACTION, transaction.id);

        let response = server
            .delete(&endpoint)
            .add_header("Authorization", format!("Bearer {token}"))
            .await;

        response.assert_status_ok();
        response.assert_json(&MessageBody::new("Transaction deleted successfully"));
        assert_eq!(
            get_transaction(transaction.id, user.id, &state.db_connection.lock().unwrap()),
            Err(Error::TransactionNotFound)
        );
        server
            .delete(&endpoint)
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_other_users_transaction_is_not_found() {
        let state = create_test_state();
        let (owner, _) = create_test_user(&state.db_connection, "ada@example.com");
        let (_, other_token) = create_test_user(&state.db_connection, "grace@example.com");
        let transaction =
            create_transaction(owner.id, groceries(), &state.db_connection.lock().unwrap())
                .unwrap();
        let server = TestServer::new(build_router(state.clone())).unwrap();

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .add_header("Authorization", format!("Bearer {other_token}"))
            .await
            .assert_status_not_found();

        assert!(
            get_transaction(transaction.id, owner.id, &state.db_connection.lock().unwrap())
                .is_ok()
        );
    }
}
