//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{auth_guard, get_session_data, post_log_out},
    category::get_categories,
    dashboard::{get_dashboard_stats, get_monthly_analytics},
    endpoints,
    export::{export_csv, export_pdf},
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, list_transactions_endpoint,
    },
    user::get_current_user,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::SESSION_DATA, get(get_session_data))
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::CATEGORIES, get(get_categories));

    let protected_routes = Router::new()
        .route(endpoints::ME, get(get_current_user))
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD_STATS, get(get_dashboard_stats))
        .route(endpoints::MONTHLY_ANALYTICS, get(get_monthly_analytics))
        .route(endpoints::EXPORT_CSV, get(export_csv))
        .route(endpoints::EXPORT_PDF, get(export_pdf))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
