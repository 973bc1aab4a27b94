use crate::application::circulation::CirculationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(CirculationError);

impl From<CirculationError> for ApiError {
    fn from(err: CirculationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            CirculationError::BorrowingNotFound => (
                StatusCode::NOT_FOUND,
                "BORROWING_NOT_FOUND",
                "Borrowing not found",
            ),

            // 422 Unprocessable Entity - ビジネスルール違反
            CirculationError::InvalidBook => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_BOOK",
                "Book not found or not available for borrowing",
            ),
            CirculationError::InvalidReader => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_READER",
                "Reader not found",
            ),
            CirculationError::CapacityExceeded => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CAPACITY_EXCEEDED",
                "Borrowing cap exceeded (max 5 open borrowings per reader)",
            ),
            CirculationError::InvalidDueDate => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_DUE_DATE",
                "Due date is earlier than today",
            ),
            CirculationError::AlreadyReturned => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ALREADY_RETURNED",
                "Borrowing is already returned",
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            CirculationError::StoreError(ref e) => {
                tracing::error!("Record store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Record store error",
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
