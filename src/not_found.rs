use axum::response::{IntoResponse, Response};

use crate::Error;

/// Fallback route handler for paths that do not match any route.
pub async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
