//! CSV and PDF reports of a user's transactions.

mod csv;
mod handlers;
mod pdf;

pub use handlers::{export_csv, export_pdf};
