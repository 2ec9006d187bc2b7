//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the payloads for creating and updating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod query;

pub use core::{Transaction, TransactionId, TransactionType, create_transaction_table};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use query::{TRANSACTION_QUERY_LIMIT, TransactionFilter, list_transactions};

#[cfg(test)]
pub use core::{
    NewTransaction, TransactionUpdate, create_transaction, delete_transaction, get_transaction,
    update_transaction,
};
