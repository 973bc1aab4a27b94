/// 貸出開始バリデーションのエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowValidationError {
    /// 返却期限が貸出日より前
    DueDateBeforeBorrowDate,
}

/// 返却のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnBorrowingError {
    /// 既に返却済み
    AlreadyReturned,
}
