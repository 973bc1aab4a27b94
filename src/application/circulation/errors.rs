use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
///
/// すべて呼び出し側で回復可能な失敗であり、ストアを中途半端な状態に
/// 残さない（検証はすべて変更に先行する）。
#[derive(Debug, Error)]
pub enum CirculationError {
    /// 書籍が存在しない、または貸出可能でない
    #[error("Book not found or not available for borrowing")]
    InvalidBook,

    /// 読者が存在しない
    #[error("Reader not found")]
    InvalidReader,

    /// 貸出上限（5冊）を超えている
    #[error("Borrowing cap exceeded (max 5 open borrowings per reader)")]
    CapacityExceeded,

    /// 返却期限が今日より前
    #[error("Due date is earlier than today")]
    InvalidDueDate,

    /// 貸出記録が見つからない
    #[error("Borrowing not found")]
    BorrowingNotFound,

    /// 既に返却済み
    #[error("Borrowing is already returned")]
    AlreadyReturned,

    /// レコードストアのエラー
    #[error("Record store error")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CirculationError>;
