use crate::application::circulation::{
    ServiceDependencies, borrow_book as execute_borrow_book, return_book as execute_return_book,
};
use crate::application::statistics;
use crate::domain::book::BookStatus;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        BookResponse, BookReturnedResponse, BorrowRequest, BorrowingCreatedResponse,
        BorrowingResponse, ErrorResponse, LimitQuery, ListBooksQuery, ListBorrowingsQuery,
        MonthlyQuery, ReaderResponse, ReturnRequest,
    },
};

/// 月次推移のデフォルト月数
const DEFAULT_MONTHS: u32 = 6;

/// ランキングのデフォルト件数
const DEFAULT_RANKING_LIMIT: usize = 5;

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /borrowings - 新しい貸出を作成
///
/// 強制されるビジネスルール:
/// - 書籍が存在し、貸出可能であること
/// - 読者が存在すること
/// - 返却期限が今日より前でないこと
/// - 読者の貸出数が上限（5冊）を超えないこと
pub async fn create_borrowing(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BorrowRequest>,
) -> Result<(StatusCode, Json<BorrowingCreatedResponse>), ApiError> {
    let cmd = req.to_command();

    let borrowing = execute_borrow_book(&state.service_deps, cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowingCreatedResponse::from(borrowing)),
    ))
}

/// POST /borrowings/:id/return - 書籍を返却
///
/// 強制されるビジネスルール:
/// - 貸出記録が存在すること
/// - 既に返却済みでないこと
///
/// 書籍は返却時の状態（good / damaged）に応じて
/// 貸出可能または破損扱いになる。
pub async fn return_borrowing(
    State(state): State<Arc<AppState>>,
    Path(borrowing_id): Path<Uuid>,
    Json(req): Json<ReturnRequest>,
) -> Result<(StatusCode, Json<BookReturnedResponse>), ApiError> {
    let cmd = req.to_command(borrowing_id);

    let returned = execute_return_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(BookReturnedResponse::from(returned))))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /borrowings - オプションフィルタ付き貸出一覧取得
///
/// クエリパラメータ:
/// - status: ステータスでフィルタリング（borrowed, returned）（オプション）
///
/// 貸出受付画面の貸出中テーブルが主な利用者。
pub async fn list_borrowings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBorrowingsQuery>,
) -> Result<Json<Vec<BorrowingResponse>>, QueryError> {
    let only_open = match query.status.as_deref() {
        None => None,
        Some("borrowed") => Some(true),
        Some("returned") => Some(false),
        Some(other) => {
            return Err(QueryError::BadRequest(format!(
                "Invalid borrowing status: {}",
                other
            )));
        }
    };

    let borrowings = state
        .service_deps
        .record_store
        .list_borrowings()
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    let responses: Vec<BorrowingResponse> = borrowings
        .into_iter()
        .filter(|b| only_open.is_none_or(|open| b.is_open() == open))
        .map(BorrowingResponse::from)
        .collect();

    Ok(Json(responses))
}

/// GET /books - オプションフィルタ付き書籍一覧取得
///
/// 貸出フォームの書籍セレクトは status=available で絞り込む。
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<Vec<BookResponse>>, QueryError> {
    let status_filter: Option<BookStatus> = match query.status.as_deref() {
        None => None,
        Some(s) => Some(s.parse().map_err(QueryError::BadRequest)?),
    };

    let books = state
        .service_deps
        .record_store
        .list_books()
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    let responses: Vec<BookResponse> = books
        .into_iter()
        .filter(|b| status_filter.is_none_or(|status| b.status == status))
        .map(BookResponse::from)
        .collect();

    Ok(Json(responses))
}

/// GET /readers - 読者一覧取得
pub async fn list_readers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReaderResponse>>, QueryError> {
    let readers = state
        .service_deps
        .record_store
        .list_readers()
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    Ok(Json(readers.into_iter().map(ReaderResponse::from).collect()))
}

// ============================================================================
// Statistics handlers (GET)
// ============================================================================

/// GET /stats/summary - サマリー集計
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<statistics::Summary>, ApiError> {
    let summary = statistics::summary(&state.service_deps).await?;
    Ok(Json(summary))
}

/// GET /stats/overdue - 延滞一覧（延滞日数の計算済み）
pub async fn get_overdue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<statistics::OverdueEntry>>, ApiError> {
    let entries = statistics::overdue_report(&state.service_deps).await?;
    Ok(Json(entries))
}

/// GET /stats/monthly - 月次推移（デフォルトは直近6ヶ月）
///
/// monthsは集計側で上限（120ヶ月）に打ち切られる。
pub async fn get_monthly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<statistics::MonthlySeries>, ApiError> {
    let months = query.months.unwrap_or(DEFAULT_MONTHS);
    let series = statistics::monthly_series(&state.service_deps, months).await?;
    Ok(Json(series))
}

/// GET /stats/categories - カテゴリ分布
pub async fn get_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<statistics::CategoryCount>>, ApiError> {
    let counts = statistics::category_distribution(&state.service_deps).await?;
    Ok(Json(counts))
}

/// GET /stats/top-books - 貸出回数の多い書籍（デフォルトは上位5件）
pub async fn get_top_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<statistics::BookRanking>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RANKING_LIMIT);
    let rankings = statistics::top_borrowed_books(&state.service_deps, limit).await?;
    Ok(Json(rankings))
}

/// GET /stats/top-readers - 貸出回数の多い読者（デフォルトは上位5件）
pub async fn get_top_readers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<statistics::ReaderRanking>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RANKING_LIMIT);
    let rankings = statistics::top_active_readers(&state.service_deps, limit).await?;
    Ok(Json(rankings))
}

// ============================================================================
// Error types
// ============================================================================

/// クエリハンドラー用のエラー型
#[derive(Debug)]
pub enum QueryError {
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            QueryError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            QueryError::InternalError(msg) => {
                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                tracing::error!("Internal error in query handler: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
