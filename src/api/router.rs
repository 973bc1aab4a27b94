use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_borrowing, get_categories, get_monthly, get_overdue, get_summary,
    get_top_books, get_top_readers, list_books, list_borrowings, list_readers, return_borrowing,
};

/// Creates the API router with all circulation endpoints
///
/// Command endpoints (Write operations):
/// - POST /borrowings - Borrow a book
/// - POST /borrowings/:id/return - Return a book
///
/// Query endpoints (Read operations):
/// - GET /borrowings - List borrowings with optional status filter
/// - GET /books - List books with optional status filter
/// - GET /readers - List readers
/// - GET /stats/* - Derived statistics views
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Command endpoints (Write operations)
        .route("/borrowings", post(create_borrowing))
        .route("/borrowings/:id/return", post(return_borrowing))
        // Query endpoints (Read operations)
        .route("/borrowings", get(list_borrowings))
        .route("/books", get(list_books))
        .route("/readers", get(list_readers))
        // Statistics endpoints (Read-only aggregation)
        .route("/stats/summary", get(get_summary))
        .route("/stats/overdue", get(get_overdue))
        .route("/stats/monthly", get(get_monthly))
        .route("/stats/categories", get(get_categories))
        .route("/stats/top-books", get(get_top_books))
        .route("/stats/top-readers", get(get_top_readers))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
